use diorama::config::DancerConfig;
use diorama::demo::DancerDemo;
use diorama::{logging, view};

fn main() {
    logging::init();

    if let Err(e) = view::run(DancerDemo::new(DancerConfig::default())) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
