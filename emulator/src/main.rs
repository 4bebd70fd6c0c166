mod session;

use std::env;
use std::io;
use std::process;

use lumen_core::sequencer::BREATHE_CYCLE_LENGTH;
use session::Session;

fn main() -> io::Result<()> {
    let cycles = parse_cycles().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("Usage: lumen-emulator [--cycles <count>] | lumen-emulator <count>");
        process::exit(2);
    });

    let mut session = Session::new();
    session.run(cycles)
}

fn parse_cycles() -> Result<u64, String> {
    let mut args = env::args().skip(1);
    let Some(arg) = args.next() else {
        return Ok(u64::from(BREATHE_CYCLE_LENGTH));
    };

    let value = if let Some(value) = arg.strip_prefix("--cycles=") {
        value.to_string()
    } else if arg == "--cycles" {
        args.next().ok_or("Expected value after --cycles")?
    } else {
        arg
    };

    value
        .parse::<u64>()
        .map_err(|_| format!("Not a cycle count: {value}"))
}
