//! Machine Monitor - stdin/stdout driver
//!
//! Reads one JSON telemetry payload per line from stdin, runs the
//! dashboard core on its own thread and writes every snapshot to stdout
//! as JSON lines. Logs go to stderr.

use std::io::{self, BufRead};
use std::process::ExitCode;

use machine_monitor_core::constants::{self, APP_NAME, APP_VERSION};
use machine_monitor_core::logic::model::Classifier;
use machine_monitor_core::{DashboardConfig, DashboardCore, Decoder, JsonlSink, RuleClassifier, Runner};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    let config = DashboardConfig::from_env();
    let tick = config.tick_interval();
    let decoder = Decoder::new(config.voltage);

    let core = match DashboardCore::new(config) {
        Ok(core) => core,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let core = match select_classifier() {
        Some(classifier) => core.with_classifier(classifier),
        None => core,
    };
    let core = core.with_sink(Box::new(JsonlSink::new(io::stdout())));

    let runner = match Runner::spawn(core, tick) {
        Ok(runner) => runner,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let ingress = runner.ingress_handle();

    let mut rejected = 0u64;
    for (line_no, line) in io::stdin().lock().lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("stdin read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match decoder.decode(line.as_bytes()) {
            Ok(record) => ingress.enqueue(record),
            Err(e) => {
                rejected += 1;
                log::warn!("Dropping payload on line {}: {}", line_no + 1, e);
            }
        }
    }

    log::info!("Input closed - shutting down");

    match runner.stop() {
        Ok(core) => {
            let stats = core.stats();
            log::info!(
                "Done: {} records ingested, {} evicted, {} rejected payloads, {} classifier failures",
                stats.records_ingested,
                stats.records_evicted,
                rejected,
                stats.classifier_failures
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// ONNX model when `MODEL_PATH` is set (and built with `onnx`), rule
/// classifier otherwise, nothing when `CLASSIFIER=none`
fn select_classifier() -> Option<Box<dyn Classifier>> {
    if !constants::is_classifier_enabled() {
        log::info!("CLASSIFIER=none - running without a classifier");
        return None;
    }

    if let Some(path) = constants::get_model_path() {
        #[cfg(feature = "onnx")]
        {
            match machine_monitor_core::logic::model::OnnxClassifier::load(&path) {
                Ok(model) => return Some(Box::new(model)),
                Err(e) => log::warn!("ONNX model not loaded: {} - using rule classifier", e),
            }
        }

        #[cfg(not(feature = "onnx"))]
        log::warn!(
            "MODEL_PATH={} ignored: built without the `onnx` feature - using rule classifier",
            path
        );
    }

    Some(Box::new(RuleClassifier::default()))
}
