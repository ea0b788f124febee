use elevator_bank::harness::scenarios;

use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let outcomes = scenarios::run_all();
    let mut failed = 0;
    for (name, outcome) in &outcomes {
        match outcome {
            Ok(()) => println!("[PASS] {}", name),
            Err(reason) => {
                failed += 1;
                println!("[FAIL] {}: {}", name, reason);
            }
        }
    }

    println!("{}/{} scenarios passed", outcomes.len() - failed, outcomes.len());
    if failed > 0 {
        process::exit(1);
    }
}
