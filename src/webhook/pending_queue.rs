/// 待投递消息队列
///
/// 按插入顺序保存尚未投递的消息，只在一次投递尝试时被整体取出。
/// 队列不设上限，远端长时间不可用时会持续增长
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PendingQueue {
    messages: Vec<String>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条消息
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    /// 取出全部排队消息并与新消息合并
    ///
    /// 新消息排在最后，各消息以换行连接，调用后队列为空
    pub fn take_merged(&mut self, message: Option<&str>) -> String {
        if let Some(message) = message {
            self.messages.push(message.to_string());
        }
        std::mem::take(&mut self.messages).join("\n")
    }
}
