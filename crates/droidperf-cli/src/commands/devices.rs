use super::BridgeOptions;

pub fn run(opts: &BridgeOptions<'_>) {
    let session = super::make_session(opts, super::no_publisher());
    let devices = session.list_devices().unwrap_or_else(|e| super::fail(e));
    if devices.is_empty() {
        println!("No ready devices. Check the USB cable and the debugging authorization prompt.");
        return;
    }
    println!("{} ready device(s):", devices.len());
    for device in devices {
        println!("  {device}");
    }
}
