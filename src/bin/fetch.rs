use diorama::config::FetchConfig;
use diorama::demo::FetchDemo;
use diorama::{logging, view};

fn main() {
    logging::init();

    if let Err(e) = view::run(FetchDemo::new(FetchConfig::default())) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
