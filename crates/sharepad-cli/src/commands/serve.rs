//! Server command implementation.

use anyhow::Result;
use sharepad_core::web::{WebServer, WebServerConfig};

use super::{Globals, ServeArgs};
use crate::ui::{print_qr, UrlBox};

/// Run the serve command.
pub async fn run(args: ServeArgs, globals: &Globals) -> Result<()> {
    let mut config = WebServerConfig::from(&globals.config.server);
    if let Some(port) = args.port {
        config.port = port;
    }
    config.localhost_only |= args.localhost_only;
    config.enforce_image_limit |= args.enforce_image_limit;

    let server = WebServer::new(config);
    let urls = server.addresses();

    if globals.json {
        super::print_json(&serde_json::json!({
            "status": "serving",
            "port": server.config().port,
            "addresses": urls,
            "enforce_image_limit": server.config().enforce_image_limit,
        }))?;
    } else if !globals.quiet {
        println!();
        println!("Sharepad");
        println!("{}", "-".repeat(45));
        println!();
        println!("  Open on any device in your network:");
        println!();
        UrlBox::new(&urls).display();
        println!();

        let show_qr = globals.config.ui.show_qr && !args.no_qr;
        if let (true, Some(url)) = (show_qr, urls.last()) {
            print_qr(url);
            println!();
        }
        println!("  Press Ctrl+C to stop");
        println!();
    }

    server.start().await?;

    if globals.chatty() {
        println!("  Server stopped.");
    }
    Ok(())
}
