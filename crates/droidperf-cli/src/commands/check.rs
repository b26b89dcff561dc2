use super::BridgeOptions;

pub fn run(opts: &BridgeOptions<'_>) {
    let session = super::make_session(opts, super::no_publisher());
    if session.check_bridge_available() {
        println!("adb is available and lists at least one device");
    } else {
        super::fail("adb is not reachable or no device is attached");
    }
}
