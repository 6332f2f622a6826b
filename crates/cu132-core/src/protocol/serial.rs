//! Serial port handling
//!
//! Opens and configures the port the simulated control unit listens on.

use serialport::{SerialPort, SerialPortInfo, SerialPortType};
use std::time::Duration;

use super::ProtocolError;
use crate::config::{Parity, PortSettings};

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Port name (e.g., "/dev/ttyUSB0" or "COM4")
    pub name: String,

    /// Short description of the port type
    pub kind: String,

    /// Product name (if available)
    pub product: Option<String>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let (kind, product) = match info.port_type {
            SerialPortType::UsbPort(usb) => (
                format!("USB {:04x}:{:04x}", usb.vid, usb.pid),
                usb.product,
            ),
            SerialPortType::PciPort => ("PCI".to_string(), None),
            SerialPortType::BluetoothPort => ("Bluetooth".to_string(), None),
            SerialPortType::Unknown => ("unknown".to_string(), None),
        };

        Self {
            name: info.port_name,
            kind,
            product,
        }
    }
}

/// List available serial ports, sorted by name
pub fn list_ports() -> Result<Vec<PortInfo>, ProtocolError> {
    let mut ports: Vec<PortInfo> = serialport::available_ports()
        .map_err(|e| ProtocolError::SerialError(e.to_string()))?
        .into_iter()
        .map(PortInfo::from)
        .collect();
    ports.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(ports)
}

fn data_bits(bits: u8) -> Result<serialport::DataBits, ProtocolError> {
    match bits {
        5 => Ok(serialport::DataBits::Five),
        6 => Ok(serialport::DataBits::Six),
        7 => Ok(serialport::DataBits::Seven),
        8 => Ok(serialport::DataBits::Eight),
        other => Err(ProtocolError::SerialError(format!(
            "unsupported data bits: {}",
            other
        ))),
    }
}

fn stop_bits(bits: u8) -> Result<serialport::StopBits, ProtocolError> {
    match bits {
        1 => Ok(serialport::StopBits::One),
        2 => Ok(serialport::StopBits::Two),
        other => Err(ProtocolError::SerialError(format!(
            "unsupported stop bits: {}",
            other
        ))),
    }
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

/// Open and configure the serial port described by `settings`
pub fn open_port(settings: &PortSettings) -> Result<Box<dyn SerialPort>, ProtocolError> {
    tracing::info!(
        "Opening {} at {} baud ({}{}{})",
        settings.name,
        settings.baud_rate,
        settings.data_bits,
        settings.parity.letter(),
        settings.stop_bits
    );

    serialport::new(&settings.name, settings.baud_rate)
        .data_bits(data_bits(settings.data_bits)?)
        .parity(settings.parity.into())
        .stop_bits(stop_bits(settings.stop_bits)?)
        .flow_control(serialport::FlowControl::None)
        .timeout(Duration::from_millis(settings.timeout_ms))
        .open()
        .map_err(|e| ProtocolError::SerialError(format!("{}: {}", settings.name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_ports() {
        // Only checks that enumeration does not panic; CI machines may have no ports
        if let Ok(ports) = list_ports() {
            for port in &ports {
                println!("Found port: {} ({})", port.name, port.kind);
            }
        }
    }

    #[test]
    fn test_data_bits_mapping() {
        assert_eq!(data_bits(8).unwrap(), serialport::DataBits::Eight);
        assert!(data_bits(9).is_err());
    }

    #[test]
    fn test_stop_bits_mapping() {
        assert_eq!(stop_bits(1).unwrap(), serialport::StopBits::One);
        assert!(stop_bits(3).is_err());
    }

    #[test]
    fn test_parity_mapping() {
        assert_eq!(serialport::Parity::from(Parity::None), serialport::Parity::None);
        assert_eq!(serialport::Parity::from(Parity::Even), serialport::Parity::Even);
    }

    #[test]
    fn test_open_missing_port() {
        let settings = PortSettings {
            name: "/dev/cu132-does-not-exist".to_string(),
            ..PortSettings::default()
        };
        assert!(matches!(
            open_port(&settings),
            Err(ProtocolError::SerialError(_))
        ));
    }
}
