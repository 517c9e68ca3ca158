use std::error::Error;
use std::path::PathBuf;
use std::process;

use fd_roundtrip::{
    config::{DEFAULT_PAYLOAD, DEFAULT_READ_LEN, EXIT_USAGE, EXIT_VERIFY_FAILED},
    logging, Reposition, RoundTripVerifier, Verification, VerifyError,
};
use log::info;
use structopt::{clap::ErrorKind, StructOpt};

#[derive(Debug, StructOpt)]
#[structopt(name = "fdprobe", about = "Write then read back through one descriptor")]
struct Opt {
    #[structopt(help = "Existing file, fifo or device to probe", parse(from_os_str))]
    path: PathBuf,
    #[structopt(short, long, help = "Bytes to write [default: test2]")]
    payload: Option<String>,
    #[structopt(short, long, help = "Bytes to read back [default: 5]")]
    read_len: Option<usize>,
    #[structopt(long, help = "Seek to offset 0 between write and read")]
    rewind: bool,
    #[structopt(
        short,
        long,
        help = "Compare read bytes against this instead of the payload"
    )]
    expect: Option<String>,
}

fn probe(opt: &Opt) -> Result<Verification, VerifyError> {
    let payload = opt.payload.as_deref().unwrap_or(DEFAULT_PAYLOAD);
    let read_len = opt.read_len.unwrap_or(DEFAULT_READ_LEN);

    let mut verifier = RoundTripVerifier::new();
    if opt.rewind {
        verifier = verifier.reposition(Reposition::Rewind);
    }
    if let Some(expected) = &opt.expect {
        verifier = verifier.expecting(expected.as_bytes());
    }
    verifier.verify(&opt.path, payload.as_bytes(), read_len)
}

fn report(v: &Verification) {
    println!("test open {}", v.descriptor);
    println!("test write {}", v.written);
    println!("test read {}", v.read);
    println!("things read {}", v.observed_lossy());
    println!("test close {}", if v.closed { 0 } else { -1 });
    println!("match {}", v.matches);
}

fn main() {
    logging::init();
    let opt = match Opt::from_iter_safe(std::env::args_os()) {
        Ok(opt) => opt,
        Err(e) if matches!(e.kind, ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed) => {
            e.exit()
        }
        Err(e) => {
            eprintln!("{}", e.message);
            process::exit(EXIT_USAGE);
        }
    };
    info!("fdprobe: {opt:?}");

    match probe(&opt) {
        Ok(v) => report(&v),
        Err(e) => {
            println!("test {} -1", e.kind());
            eprint!("fdprobe: {e}");
            if let Some(source) = e.source() {
                eprint!(": {source}");
            }
            eprintln!();
            process::exit(EXIT_VERIFY_FAILED);
        }
    }
}
