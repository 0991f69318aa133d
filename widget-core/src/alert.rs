use parking_lot::Mutex;
use std::fmt::Debug;

pub const INPUT_ALERT: &str = "都市名を入力してください";
pub const FETCH_ALERT: &str = "天気情報の取得に失敗しました。都市名を確認してください。";
pub const RENDER_ALERT: &str = "データの表示に失敗しました";
pub const CURRENT_LOCATION_ALERT: &str = "現在地の天気情報の取得に失敗しました";

/// Channel for messages the user must acknowledge.
pub trait AlertSink: Send + Sync + Debug {
    fn alert(&self, message: &str);
}

/// Keeps every alert in memory, in the order raised.
#[derive(Debug, Default)]
pub struct RecordingAlerts {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlerts {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl AlertSink for RecordingAlerts {
    fn alert(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
