use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use log::error;
use serde::Serialize;

use proclist::{ProcessSource, SystemSource};
use proclist::ffi::SystemInterface;

const USAGE: &str = "usage: proclist [--json] [--kill <pid>]";

/// `--json` 输出格式：`{processes, error}`
#[derive(Debug, Serialize)]
struct ProcessListOutput {
    processes: Option<Vec<(i32, String)>>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct KillOutput {
    result: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Default)]
struct Options {
    json: bool,
    kill: Option<String>,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();
    let mut args = args;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => options.json = true,
            "--kill" => {
                options.kill = Some(args.next().ok_or_else(|| "--kill needs a pid".to_string())?)
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            other => return Err(format!("unknown argument {:?}\n{}", other, USAGE)),
        }
    }
    Ok(options)
}

fn list(json: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match SystemSource::default().list() {
        Ok(processes) if json => {
            let output = ProcessListOutput {
                processes: Some(processes.into_iter().map(|p| (p.pid, p.executable)).collect()),
                error: None,
            };
            serde_json::to_writer(&mut out, &output)?;
            writeln!(out)?;
        }
        Ok(processes) => {
            for p in processes {
                writeln!(out, "{},{}", p.pid, p.executable)?;
            }
        }
        Err(e) if json => {
            error!("process enumeration failed: {}", e);
            let output = ProcessListOutput {
                processes: None,
                error: Some(e.to_string()),
            };
            serde_json::to_writer(&mut out, &output)?;
            writeln!(out)?;
        }
        Err(e) => {
            eprintln!("Error in get processes: {}", e);
        }
    }

    out.flush()
}

fn kill(pid: &str, json: bool) -> bool {
    let result = pid
        .trim()
        .parse::<i32>()
        .map_err(|_| "PID is not a number".to_string())
        .and_then(|pid| {
            SystemInterface::new()
                .terminate(pid)
                .map(|()| format!("SUCCESS: sent SIGTERM to process {}", pid))
                .map_err(|e| format!("ERROR: process {}: {}", pid, e))
        });

    let ok = result.is_ok();
    if json {
        let output = match result {
            Ok(msg) => KillOutput { result: Some(msg), error: None },
            Err(msg) => KillOutput { result: None, error: Some(msg) },
        };
        match serde_json::to_string(&output) {
            Ok(line) => println!("{}", line),
            Err(e) => error!("failed to encode result: {}", e),
        }
    } else {
        match result {
            Ok(msg) => println!("{}", msg),
            Err(msg) => eprintln!("{}", msg),
        }
    }

    ok
}

fn main() -> ExitCode {
    if let Err(e) = proclist::init() {
        eprintln!("failed to initialize: {}", e);
    }

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::FAILURE;
        }
    };

    if let Some(pid) = options.kill.as_deref() {
        return if kill(pid, options.json) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    if let Err(e) = list(options.json) {
        // 管道被关闭时静默退出
        if e.kind() != io::ErrorKind::BrokenPipe {
            eprintln!("failed to write process list: {}", e);
        }
    }
    ExitCode::SUCCESS
}
