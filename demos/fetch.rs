//! Performs one request and prints the normalized result as JSON.
//!
//! Usage: `cargo run --example fetch -- [-X METHOD] [-H "Name: value"]... [-d BODY] URL`
//!
//! Set `RUST_LOG=debug` to see what the adapter does.

use anyhow::{anyhow, bail, Context};
use request_adapter::{perform, Rejection, RequestConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut builder = RequestConfig::builder();
    let mut url = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-X" => builder = builder.method(args.next().context("-X needs a method")?),
            "-d" => builder = builder.body(args.next().context("-d needs a body")?),
            "-H" => {
                let raw = args.next().context("-H needs a header")?;
                let (name, value) = raw
                    .split_once(':')
                    .ok_or_else(|| anyhow!("header {raw:?} is not in 'Name: value' form"))?;
                builder = builder.header(name.trim(), value.trim());
            }
            _ if url.is_none() => url = Some(arg),
            _ => bail!("unexpected argument {arg:?}"),
        }
    }

    let Some(url) = url else {
        bail!("usage: fetch [-X METHOD] [-H \"Name: value\"]... [-d BODY] URL");
    };
    let config = builder.build()?;

    match perform(&url, Some(config)).await {
        Ok(resp) => {
            println!("{}", serde_json::to_string_pretty(&resp)?);
            Ok(())
        }
        Err(Rejection::Http(resp)) => {
            println!("{}", serde_json::to_string_pretty(&resp)?);
            bail!("server answered {} {}", resp.status, resp.status_text)
        }
        Err(e) => Err(e.into()),
    }
}
