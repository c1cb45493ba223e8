//! Fetch command - intercept a single request

use crate::cache::{Method, Request};
use crate::cli::args::FetchArgs;
use crate::config::Config;
use crate::error::{RecymError, RecymResult};
use crate::worker::create_worker;
use console::style;
use std::io::{self, Write};

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> RecymResult<()> {
    let worker = create_worker(config)?;

    let method: Method = args.method.parse()?;
    let mut request = Request::resolve(&args.url, &worker.settings().origin)?.with_method(method);
    for (name, value) in args.headers {
        request = request.with_header(name, value);
    }
    if let Some(data) = args.data {
        request = request.with_body(data);
    }

    let strategy = worker.route(&request);
    let response = worker.handle_fetch(&request).await;

    let status = if response.is_ok() {
        style(response.status.to_string()).green()
    } else {
        style(response.status.to_string()).red()
    };
    eprintln!(
        "{} {} {} [{}]",
        status,
        request.method,
        request.url,
        style(strategy).dim()
    );

    if args.body {
        let mut stdout = io::stdout();
        stdout
            .write_all(&response.body)
            .and_then(|_| stdout.flush())
            .map_err(|e| RecymError::io("writing response body", e))?;
    } else {
        println!("{} {}", response.status, response.text().lines().next().unwrap_or(""));
    }

    if !args.no_settle {
        let settled = worker.settle().await;
        if settled > 0 {
            eprintln!("{} refreshed {} cached copy(ies)", style("↻").dim(), settled);
        }
    }

    Ok(())
}
