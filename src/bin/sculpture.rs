use diorama::config::SculptureConfig;
use diorama::demo::SculptureDemo;
use diorama::{logging, view};

fn main() {
    logging::init();

    if let Err(e) = view::run(SculptureDemo::new(SculptureConfig::default())) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
