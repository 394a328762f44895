use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    capital_projects::app::run_pipeline_cli(std::env::args().skip(1))
}
