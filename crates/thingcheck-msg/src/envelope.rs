use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

use thingcheck_schema::{DeviceName, ProductId};

use crate::error::MsgError;

/// Message published by a device, as forwarded by the gateway.
///
/// `payload` travels base64-encoded in JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevPublish {
    /// Source topic; only used for logging.
    #[serde(default)]
    pub topic: String,
    /// Receive time in milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: i64,
    /// Product the device belongs to.
    #[serde(rename = "productID")]
    pub product_id: String,
    /// Device name within the product.
    pub device_name: String,
    /// First topic segment (`thing`, `ota`, `config`, ...).
    pub handle: String,
    /// Operation type taken from the topic (`property`, `event`, `action`, ...).
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Raw payload bytes.
    #[serde(default, with = "payload_base64")]
    pub payload: Vec<u8>,
    /// Protocol the device speaks.
    #[serde(default)]
    pub protocol_code: String,
}

/// Connection state change reported for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnAction {
    /// The device logged in.
    Connected,
    /// The device went away.
    Disconnected,
}

impl fmt::Display for ConnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnAction::Connected => f.write_str("connected"),
            ConnAction::Disconnected => f.write_str("disconnected"),
        }
    }
}

/// Connect or disconnect notice published by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevConn {
    /// Login user name.
    #[serde(default)]
    pub username: String,
    /// Event time in milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: i64,
    /// Remote address of the connection.
    #[serde(default, rename = "addr")]
    pub address: String,
    /// Transport client id.
    #[serde(default, rename = "clientID")]
    pub client_id: String,
    /// Why the connection changed state.
    #[serde(default)]
    pub reason: String,
    /// The state change.
    pub action: ConnAction,
    /// Product the device belongs to.
    #[serde(rename = "productID")]
    pub product_id: String,
    /// Device name within the product.
    #[serde(rename = "deviceName")]
    pub device_name: String,
}

impl DevConn {
    /// Validated product and device identifiers of the device.
    pub fn sender(&self) -> Result<(ProductId, DeviceName), MsgError> {
        Ok((
            ProductId::parse(self.product_id.as_str())?,
            DeviceName::parse(self.device_name.as_str())?,
        ))
    }

    /// Returns true for a login notice.
    pub fn is_connected(&self) -> bool {
        self.action == ConnAction::Connected
    }
}

/// Anything the gateway forwards upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GatewayMsg {
    /// Connection state change.
    Conn(DevConn),
    /// Published device message.
    Publish(DevPublish),
}

/// Message another service hands the gateway for delivery to a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InnerPublish {
    /// First topic segment.
    pub handle: String,
    /// Operation type.
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Raw payload bytes.
    #[serde(default, with = "payload_base64")]
    pub payload: Vec<u8>,
    /// Target product.
    #[serde(rename = "productID")]
    pub product_id: String,
    /// Target device.
    pub device_name: String,
    /// Protocol the device speaks.
    #[serde(default)]
    pub protocol_code: String,
}

impl DevPublish {
    /// Validated product and device identifiers of the sender.
    pub fn sender(&self) -> Result<(ProductId, DeviceName), MsgError> {
        Ok((
            ProductId::parse(self.product_id.as_str())?,
            DeviceName::parse(self.device_name.as_str())?,
        ))
    }
}

/// Packs a message for delivery to a device.
pub fn publish_to_dev(
    handle: &str,
    msg_type: &str,
    payload: &[u8],
    protocol_code: &str,
    product_id: &str,
    device_name: &str,
) -> Result<Vec<u8>, MsgError> {
    let publish = InnerPublish {
        handle: handle.to_string(),
        msg_type: msg_type.to_string(),
        payload: payload.to_vec(),
        product_id: product_id.to_string(),
        device_name: device_name.to_string(),
        protocol_code: protocol_code.to_string(),
    };
    Ok(serde_json::to_vec(&publish)?)
}

/// Unpacks a message packed by [`publish_to_dev`].
pub fn get_publish(data: &[u8]) -> Result<InnerPublish, MsgError> {
    Ok(serde_json::from_slice(data)?)
}

impl fmt::Display for DevPublish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = json!({
            "topic": self.topic,
            "timestamp": self.timestamp,
            "productID": self.product_id,
            "deviceName": self.device_name,
            "handle": self.handle,
            "type": self.msg_type,
            "payload": String::from_utf8_lossy(&self.payload),
            "protocolCode": self.protocol_code,
        });
        write!(f, "{view}")
    }
}

impl fmt::Display for InnerPublish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = json!({
            "handle": self.handle,
            "type": self.msg_type,
            "payload": String::from_utf8_lossy(&self.payload),
            "productID": self.product_id,
            "deviceName": self.device_name,
            "protocolCode": self.protocol_code,
        });
        write!(f, "{view}")
    }
}

impl fmt::Display for DevConn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = json!({
            "username": self.username,
            "timestamp": self.timestamp,
            "addr": self.address,
            "clientID": self.client_id,
            "reason": self.reason,
            "action": self.action,
            "productID": self.product_id,
            "deviceName": self.device_name,
        });
        write!(f, "{view}")
    }
}

mod payload_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
