//! condcov CLI: condition-level branch coverage
//!
//! ## Usage
//!
//! ```bash
//! condcov sample_code.py test_file.py              # Text report
//! condcov sample_code.py tests/*.py --format json  # JSON report
//! condcov -v sample_code.py test_file.py           # With progress logging
//! ```

use clap::Parser;
use condcov_cli::{init_logging, Cli, CoverageRunner};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.config();

    if let Err(e) = init_logging(config.verbosity, config.color.should_color()) {
        eprintln!("Warning: {e}");
    }

    let runner = CoverageRunner::new(config);
    match runner.run(&cli.target, &cli.tests) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            runner.reporter().failure(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}
