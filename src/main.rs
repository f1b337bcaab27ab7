#[macro_use] extern crate log;
#[macro_use] extern crate serde_json;
extern crate argparse;
extern crate env_logger;
extern crate libcantal;
extern crate tokio_core;
extern crate routeplex;

use std::cell::RefCell;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process::exit;
use std::rc::Rc;
use std::sync::Arc;

use argparse::{ArgumentParser, Parse, StoreTrue, Print};
use tokio_core::reactor::Core;

use routeplex::PushOptions;
use routeplex::channel::ChannelService;
use routeplex::config::read_config;
use routeplex::connector::SessionConnector;
use routeplex::intern::Route;
use routeplex::metrics;
use routeplex::remote::{self, LocalRemote};
use routeplex::router::Router;
use routeplex::session::SessionService;


pub fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "warn");
    }
    env_logger::init();

    let mut config = PathBuf::from("/etc/routeplex.yaml");
    let mut check = false;
    {
        let mut ap = ArgumentParser::new();
        ap.set_description("
            Validates a cluster config and runs the session and channel
            routing core for every frontend listed in it, inside a single
            process. Prints the resulting routing table.
        ");
        ap.refer(&mut config)
            .add_option(&["-c", "--config"], Parse,
                "Configuration file name")
            .metavar("PATH");
        ap.refer(&mut check)
            .add_option(&["--check-config"], StoreTrue,
            "Check configuration file and exit");
        ap.add_option(&["--version"],
            Print(env!("CARGO_PKG_VERSION").to_string()),
            "Show version");
        ap.parse_args_or_exit();
    }

    let cfg = match read_config(&config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Error reading config {:?}: {}", config, e);
            exit(1);
        }
    };
    if check {
        exit(0);
    }

    let metrics = metrics::all();
    let _cantal = match libcantal::start(&metrics) {
        Ok(coll) => Some(coll),
        Err(e) => {
            warn!("Can't export metrics: {}", e);
            None
        }
    };

    let mut lp = match Core::new() {
        Ok(lp) => lp,
        Err(e) => {
            error!("Can't create event loop: {}", e);
            exit(2);
        }
    };

    let router = Router::new();
    let mut registries = HashMap::new();
    for (id, server) in cfg.frontends(None) {
        let sessions = Rc::new(RefCell::new(
            SessionService::new(&cfg.sessions)));
        let connector = Rc::new(SessionConnector::new(&sessions));
        let local = LocalRemote::new(id.clone(), &sessions, connector);
        let link = remote::spawn(id.clone(), local, &lp.handle());
        router.add_frontend(id.clone(), server.server_type.clone(),
                            Rc::new(link));
        registries.insert(id.clone(), sessions);
    }
    let channels = ChannelService::new(&cfg.channels, &router);

    let ping = channels.broadcast(None, &Route::from("sys.ping"),
        &Arc::new(json!(null)), &PushOptions::default());
    if let Err(e) = lp.run(ping) {
        error!("Frontend links are broken: {}", e);
        exit(1);
    }
    info!("All {} frontend links are up", router.len());

    for server_type in router.server_types() {
        println!("{}:", &server_type[..]);
        for id in router.frontends_by_type(Some(&server_type)) {
            let count = registries.get(&id)
                .map(|s| s.borrow().sessions_count())
                .unwrap_or(0);
            println!("  {} sessions={}", &id[..], count);
        }
    }
}
