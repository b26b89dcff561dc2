use super::BridgeOptions;

pub fn run(opts: &BridgeOptions<'_>, ip: Option<&str>) {
    let session = super::make_session(opts, super::no_publisher());
    let info = super::connect(&session, ip);
    if let Some(handle) = session.device_handle() {
        println!("Device {handle}");
    }
    super::print_info(&info);
}
