/// One outgoing notification: a rendered HTML body bound for a channel,
/// optionally illustrated.
#[derive(Debug, Clone)]
pub struct Notification {
    pub channel_id: String,
    pub html_body: String,
    pub image_url: Option<String>,
}
