//! Command line flags. Hand-parsed; every flag has a config file / env equivalent.

use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub web: bool,
    pub port: Option<u16>,
    pub db: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub headless: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(ParsedArgs),
    Help(String),
}

pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--web] [--port PORT|-p PORT] [--db PATH] [--config PATH] [--headless]\n\
         \n\
         \x20 --web            push metrics to websocket clients and serve ./frontend\n\
         \x20 --port, -p PORT  web sidecar port (default 9090)\n\
         \x20 --db PATH        history database file\n\
         \x20 --config PATH    JSON settings file\n\
         \x20 --headless       run the pipeline without the terminal UI\n\
         \x20 --help, -h       show this help"
    )
}

fn parse_port(v: Option<String>, flag: &str) -> Result<u16, String> {
    let v = v.ok_or_else(|| format!("{flag} needs a value"))?;
    v.parse::<u16>()
        .map_err(|_| format!("invalid port for {flag}: {v:?}"))
}

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "batedor".into());
    let mut parsed = ParsedArgs::default();

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help(usage(&prog))),
            "--web" => parsed.web = true,
            "--headless" => parsed.headless = true,
            "--port" | "-p" => parsed.port = Some(parse_port(it.next(), &arg)?),
            "--db" => {
                parsed.db = Some(
                    it.next()
                        .map(PathBuf::from)
                        .ok_or_else(|| "--db needs a value".to_string())?,
                );
            }
            "--config" => {
                parsed.config = Some(
                    it.next()
                        .map(PathBuf::from)
                        .ok_or_else(|| "--config needs a value".to_string())?,
                );
            }
            _ if arg.starts_with("--port=") => {
                let v = arg.split_once('=').map(|(_, v)| v.to_string());
                parsed.port = Some(parse_port(v, "--port")?);
            }
            _ if arg.starts_with("--db=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        parsed.db = Some(PathBuf::from(v));
                    }
                }
            }
            _ if arg.starts_with("--config=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        parsed.config = Some(PathBuf::from(v));
                    }
                }
            }
            _ => return Err(format!("Unexpected argument {arg:?}.\n{}", usage(&prog))),
        }
    }
    Ok(Command::Run(parsed))
}
