//! BLE client for the BMS data characteristic.

use anyhow::anyhow;
use bluest::Adapter;
use bluest::AdvertisingDevice;
use bluest::Characteristic;
use bluest::Device;
use bluest::Uuid;
use futures_util::Stream;
use futures_util::StreamExt;
use tokio::time::timeout;
use tokio::time::Duration;

use crate::command::Command;
use crate::telemetry::Telemetry;

pub struct BmsClient {
    adapter: Adapter,
    device: Device,
    data: Characteristic,
}

impl BmsClient {
    const BMS_SERVICE_ID: &'static str = "0000ffe0-0000-1000-8000-00805f9b34fb";
    // A single characteristic carries both the written requests and the
    // notified responses
    const BMS_DATA_CHARACTERISTIC_ID: &'static str = "0000ffe1-0000-1000-8000-00805f9b34fb";
    // How long to wait without any notifications before considering the
    // frame completely received
    const NOTIFICATION_TIMEOUT_S: u64 = 2;

    /// Disconnect from the battery
    pub async fn stop(self) -> anyhow::Result<()> {
        self.adapter.disconnect_device(&self.device).await?;
        Ok(())
    }

    /// Create a new `BmsClient`, which includes attempting to discover
    /// the device by its advertised name.
    pub async fn new(ble_device_name: &str) -> anyhow::Result<Self> {
        let adapter = bluest::Adapter::default()
            .await
            .ok_or(anyhow!("Default adapter not found"))?;
        adapter.wait_available().await?;

        let device = timeout(
            Duration::from_secs(30),
            Self::discover_device(ble_device_name, &adapter),
        )
        .await
        .map_err(|_| anyhow!("Device not found"))??;

        adapter.connect_device(&device.device).await?;

        let bms_service = device
            .device
            .discover_services_with_uuid(Self::bms_service_id())
            .await?
            .first()
            .ok_or(anyhow!("The specified device does not expose the BMS service."))?
            .clone();
        let data = bms_service
            .discover_characteristics_with_uuid(Self::bms_data_characteristic_id())
            .await?
            .first()
            .ok_or(anyhow!(
                "The specified device does not expose the BMS data characteristic."
            ))?
            .clone();

        Ok(Self {
            adapter: adapter.clone(),
            device: device.device,
            data,
        })
    }

    /// Send each routine poll command and decode the responses into
    /// `telemetry`.
    ///
    /// A response that fails to decode is logged and dropped; the
    /// remaining fields keep their previous values. Transport failures
    /// abort the poll.
    pub async fn poll_into(&mut self, telemetry: &mut Telemetry) -> anyhow::Result<()> {
        self.try_connect().await?;

        for command in Command::POLL {
            let frame = self.request_response(command.request()).await?;
            if let Err(err) = command.decode_into(&frame, telemetry) {
                log::warn!("dropping {command:?} response: {err}");
            }
        }

        Ok(())
    }

    /// Read a fresh telemetry record from the battery
    pub async fn fetch_telemetry(&mut self) -> anyhow::Result<Telemetry> {
        let mut telemetry = Telemetry::default();
        self.poll_into(&mut telemetry).await?;
        Ok(telemetry)
    }

    /// Print every GATT service and characteristic the device exposes
    pub async fn print_services(&self) -> anyhow::Result<()> {
        for service in self.device.discover_services().await? {
            println!("service {}", service.uuid_async().await?);
            for characteristic in service.discover_characteristics().await? {
                let uuid = characteristic.uuid_async().await?;
                let properties = characteristic.properties().await?;
                println!("  characteristic {uuid} {properties:?}");
            }
        }

        Ok(())
    }

    async fn discover_device(name: &str, adapter: &Adapter) -> anyhow::Result<AdvertisingDevice> {
        let required_services = [Self::bms_service_id()];
        let mut scan = adapter.scan(&required_services).await?;
        while let Some(discovered) = timeout(Duration::from_secs(30), scan.next())
            .await
            .map_err(|_| anyhow!("Device not found"))?
        {
            // Devices that advertise the service but report no name are
            // not the battery
            match discovered.device.name_async().await {
                Ok(device_name) if device_name == name => return Ok(discovered),
                _ => {}
            }
        }

        Err(anyhow!("Device not found"))
    }

    async fn request_response(&mut self, request: &[u8]) -> anyhow::Result<Vec<u8>> {
        let notifications = self.data.notify().await?;

        log::debug!("TX: 0x{}", hex::encode(request));
        self.data.write(request).await?;

        Self::read_frame(notifications).await
    }

    /// Attempt to read a whole response frame from the device.
    ///
    /// Frames are delivered over multiple notification events and the
    /// split points drift between reads. Duplicated and truncated
    /// notifications happen as well, so counting received bytes against
    /// an expected length is not reliable. Instead, notifications are
    /// appended to the frame until none arrive for a short time, at
    /// which point the frame is considered complete. A frame that is
    /// still truncated gets caught by the decoder's length check.
    ///
    /// Unfortunately this puts a minimum time on every request, but it
    /// is the only reliable way I've found.
    async fn read_frame<T: Stream<Item = Result<Vec<u8>, bluest::Error>> + Send + Unpin>(
        mut notifications: T,
    ) -> anyhow::Result<Vec<u8>> {
        let mut frame = Vec::<u8>::new();
        loop {
            let read_result = tokio::time::timeout(
                Duration::from_secs(Self::NOTIFICATION_TIMEOUT_S),
                notifications.next(),
            )
            .await;

            match read_result {
                Err(_) => {
                    // quiet period elapsed
                    if frame.is_empty() {
                        return Err(anyhow!("no response from device"));
                    }
                    return Ok(frame);
                }
                Ok(None) => {
                    // end of stream, whatever arrived is the whole frame
                    if frame.is_empty() {
                        return Err(anyhow!("notification stream closed before any data"));
                    }
                    return Ok(frame);
                }
                Ok(Some(Ok(chunk))) => {
                    log::debug!("RX notification: 0x{}", hex::encode(&chunk));
                    frame.extend_from_slice(&chunk);
                }
                Ok(Some(Err(err))) => {
                    log::warn!("notification error: {err}");
                    return Err(err.into());
                }
            }
        }
    }

    fn bms_service_id() -> Uuid {
        Uuid::parse_str(Self::BMS_SERVICE_ID).unwrap()
    }

    fn bms_data_characteristic_id() -> Uuid {
        Uuid::parse_str(Self::BMS_DATA_CHARACTERISTIC_ID).unwrap()
    }

    async fn try_connect(&self) -> anyhow::Result<()> {
        if !self.device.is_connected().await {
            let mut retries = 2;
            loop {
                match self.adapter.connect_device(&self.device).await {
                    Ok(()) => return Ok(()),
                    Err(err) if retries > 0 => {
                        log::warn!("failed to connect: {err}");
                        retries -= 1;
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    #[tokio::test]
    async fn test_read_frame_concatenates_notification_chunks() {
        let chunks: Vec<Result<Vec<u8>, bluest::Error>> = vec![
            Ok(vec![0x00, 0x01]),
            Ok(vec![0x02]),
            Ok(vec![0x03, 0x04, 0x05]),
        ];

        let frame = BmsClient::read_frame(stream::iter(chunks)).await.unwrap();

        assert_eq!(frame, vec![0x00, 0x01, 0x02, 0x03, 0x04, 0x05]);
    }

    #[tokio::test]
    async fn test_read_frame_rejects_an_empty_stream() {
        let chunks: Vec<Result<Vec<u8>, bluest::Error>> = vec![];

        let result = BmsClient::read_frame(stream::iter(chunks)).await;

        assert!(result.is_err());
    }
}
