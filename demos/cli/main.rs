use echo_ping::{Network, Ping, PingConfig, PingError, PingListener, ProbeOutcome, State};
use std::net::IpAddr;

type GenericError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug)]
struct Error {
    pub message: String,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "Error")?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

#[derive(argh::FromArgs)]
/// ping - send ICMP ECHO_REQUEST to a host
struct Args {
    #[argh(switch, short = '4')]
    /// use IPv4 only
    ipv4: bool,

    #[argh(switch, short = '6')]
    /// use IPv6 only
    ipv6: bool,

    #[argh(option, short = 'c', default = "echo_ping::DEFAULT_COUNT")]
    /// stop after <count> sent ping messages
    count: u32,

    #[argh(option, short = 'W', default = "4000")]
    /// time to wait for a response, in milliseconds
    timeout: i64,

    #[argh(option, short = 'i', default = "1000")]
    /// wait <interval> milliseconds after each ping
    interval: i64,

    #[argh(option, short = 'I')]
    /// bind the socket to this network interface
    interface: Option<String>,

    #[argh(positional)]
    /// host name or IP address
    host: String,
}

struct PrintListener {
    dest: IpAddr,
    failures: u32,
}

impl PingListener for PrintListener {
    fn on_ping(&mut self, outcome: ProbeOutcome, index: u32) {
        if outcome.is_timeout() {
            self.failures += 1;
        }
        println!("#{index} ms: {} ip: {}", outcome.as_millis(), self.dest);
    }

    fn on_ping_error(&mut self, error: PingError, index: u32) {
        self.failures += 1;
        println!("#{index} {error}");
    }
}

fn resolve(host: &str, ipv4: bool, ipv6: bool) -> Result<IpAddr, GenericError> {
    if let Ok(ip_addr) = host.parse::<IpAddr>() {
        return Ok(ip_addr);
    }
    let addresses = dns_lookup::lookup_host(host)?;
    addresses
        .into_iter()
        .find(|ip_addr| match ip_addr {
            IpAddr::V4(_) => !ipv6,
            IpAddr::V6(_) => !ipv4,
        })
        .ok_or_else(|| Error { message: format!("no suitable address for {host}") }.into())
}

fn main() -> Result<(), GenericError> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let args: Args = argh::from_env();
    if args.ipv4 && args.ipv6 {
        return Err(Error { message: "-4 and -6 are mutually exclusive".to_string() }.into());
    }

    let dest = resolve(&args.host, args.ipv4, args.ipv6)?;
    tracing::info!("pinging {} ({})", args.host, dest);

    let config = PingConfig {
        count: args.count,
        network: args.interface.map(Network::interface),
        ..PingConfig::default()
    }
    .with_timeout_ms(args.timeout)?
    .with_delay_ms(args.interval)?;

    let mut ping = Ping::with_config(dest, PrintListener { dest, failures: 0 }, config)?;
    let count = ping.probe_count();
    ctrlc::set_handler(move || count.cancel())?;

    let worker = std::thread::spawn(move || {
        let state = ping.run();
        (state, ping.into_listener())
    });
    let (state, listener) = worker
        .join()
        .map_err(|_| Error { message: "ping thread panicked".to_string() })?;
    tracing::info!("finished in state {:?} with {} failures", state, listener.failures);

    if state == State::Aborted || listener.failures > args.count / 2 {
        std::process::exit(1);
    }
    Ok(())
}
