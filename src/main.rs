use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use tinywiki::logger::Logger;
use tinywiki::{router, AppState, Config, PageStore, TemplateComponent, WikiError};

/// Minimal wiki server
#[derive(Parser, Debug)]
#[command(name = "tinywiki")]
#[command(version)]
struct Args {
    /// Bind a free port on 127.0.0.1 and write the address to the port file
    #[arg(long)]
    addr: bool,

    /// File receiving the bound address when --addr is used
    #[arg(long, default_value = "final-port.txt")]
    port_file: PathBuf,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to listen on
    #[arg(long)]
    host: Option<IpAddr>,

    /// Directory holding one file per page
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Directory holding list.html, view.html and edit.html
    #[arg(short, long)]
    templates: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), WikiError> {
    if let Err(e) = Logger::init() {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let args = Args::parse();
    let config = Config::with_custom(args.data_dir, args.templates, args.port, args.host);

    let store = PageStore::new(config.data_dir.clone());
    log::info!("Storing pages in {:?}", store.dir());
    let templates = TemplateComponent::load(&config.template_dir);
    let app = router(AppState::new(store, templates));

    let listener = if args.addr {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let local = listener.local_addr()?;
        std::fs::write(&args.port_file, local.to_string())?;
        log::info!("Wrote bound address {} to {:?}", local, args.port_file);
        listener
    } else {
        TcpListener::bind(config.socket_addr()).await?
    };

    log::info!("Wiki listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await.map_err(WikiError::from)
}
