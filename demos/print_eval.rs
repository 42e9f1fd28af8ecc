use flageval::{Evaluator, FileDataProvider, Logger, Target};
use log::Level;

struct PrintLogger;

impl Logger for PrintLogger {
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    fn log(&self, level: Level, event_id: u16, message: &str) {
        println!("[{level}] [{event_id}] {message}");
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/data/flags.json".to_owned());
    let evaluator = Evaluator::builder()
        .provider(Box::new(FileDataProvider::new(path).unwrap()))
        .logger(Box::new(PrintLogger))
        .build()
        .unwrap();

    let target = Target::new()
        .attr("id", "user-42")
        .attr("country", "HU")
        .attr("age", 31)
        .attr("plan", "pro");

    for evaluation in evaluator.evaluate_all(&target) {
        println!("{}", serde_json::to_string(&evaluation).unwrap());
    }
}
