use super::BridgeOptions;

pub fn run(opts: &BridgeOptions<'_>, ip: Option<&str>, interval: f64) {
    let spacing = super::parse_interval(interval);
    let session = super::make_session(opts, super::no_publisher());
    super::connect(&session, ip);

    let frame = session.sample_once(spacing).unwrap_or_else(|e| super::fail(e));
    match serde_json::to_string_pretty(&frame) {
        Ok(json) => println!("{json}"),
        Err(e) => super::fail(e),
    }
}
