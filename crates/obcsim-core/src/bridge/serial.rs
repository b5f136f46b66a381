//! Serial port discovery and opening

use serialport::{SerialPort, SerialPortInfo, SerialPortType};
use std::collections::BTreeMap;
#[cfg(target_os = "linux")]
use std::fs;
use std::time::Duration;

use super::BridgeError;

/// Device name prefixes that USB-serial adapters show up under on Linux
const USB_SERIAL_PREFIXES: [&str; 2] = ["ttyACM", "ttyUSB"];

/// A serial port the adapter might be attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Device path (e.g., "/dev/ttyUSB0" or "COM3")
    pub name: String,

    /// USB vendor/product ID, if the OS reported them
    pub usb_id: Option<(u16, u16)>,

    /// Product string, if available
    pub product: Option<String>,
}

impl PortInfo {
    fn bare(name: String) -> Self {
        Self {
            name,
            usb_id: None,
            product: None,
        }
    }

    /// One-line description for listings
    pub fn describe(&self) -> String {
        match (self.usb_id, &self.product) {
            (Some((vid, pid)), Some(product)) => {
                format!("{} [{:04x}:{:04x}] {}", self.name, vid, pid, product)
            }
            (Some((vid, pid)), None) => format!("{} [{:04x}:{:04x}]", self.name, vid, pid),
            _ => self.name.clone(),
        }
    }
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        match info.port_type {
            SerialPortType::UsbPort(usb) => Self {
                name: info.port_name,
                usb_id: Some((usb.vid, usb.pid)),
                product: usb.product,
            },
            _ => Self::bare(info.port_name),
        }
    }
}

/// Ordering: ttyACM* by number, then ttyUSB* by number, then everything else
/// by name
fn port_sort_key(name: &str) -> (usize, usize, String) {
    let basename = name.rsplit('/').next().unwrap_or(name);
    for (rank, prefix) in USB_SERIAL_PREFIXES.iter().enumerate() {
        if let Some(rest) = basename.strip_prefix(prefix) {
            let num = rest.parse::<usize>().unwrap_or(usize::MAX);
            return (rank, num, basename.to_string());
        }
    }
    (USB_SERIAL_PREFIXES.len(), 0, basename.to_string())
}

/// List candidate serial ports.
///
/// On Linux, USB-serial nodes in /dev that the enumeration API missed are
/// added too.
pub fn list_ports() -> Vec<PortInfo> {
    let mut found: BTreeMap<String, PortInfo> = BTreeMap::new();
    match serialport::available_ports() {
        Ok(ports) => {
            for info in ports {
                let port = PortInfo::from(info);
                found.entry(port.name.clone()).or_insert(port);
            }
        }
        Err(e) => tracing::warn!("serial port enumeration failed: {e}"),
    }

    #[cfg(target_os = "linux")]
    if let Ok(entries) = fs::read_dir("/dev") {
        for entry in entries.flatten() {
            let Some(fname) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if USB_SERIAL_PREFIXES.iter().any(|p| fname.starts_with(p)) {
                let full = format!("/dev/{}", fname);
                found
                    .entry(full.clone())
                    .or_insert_with(|| PortInfo::bare(full));
            }
        }
    }

    let mut ports: Vec<PortInfo> = found.into_values().collect();
    ports.sort_by_key(|p| port_sort_key(&p.name));
    ports
}

/// Open the adapter's USB-serial link, 8N1 without flow control.
///
/// `timeout` bounds every read and write on the returned port.
pub fn open_port(
    name: &str,
    baud: u32,
    timeout: Duration,
) -> Result<Box<dyn SerialPort>, BridgeError> {
    serialport::new(name, baud)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .flow_control(serialport::FlowControl::None)
        .timeout(timeout)
        .open()
        .map_err(|e| BridgeError::TransportUnavailable(format!("{}: {}", name, e)))
}
