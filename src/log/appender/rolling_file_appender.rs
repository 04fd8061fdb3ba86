use crate::log::appender::LogAppender;
use anyhow::Result;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// RollingFileAppender 配置
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct RollingFileAppenderConfig {
    /// 日志文件路径
    #[default("logs/bot.log".to_string())]
    pub file_path: String,

    /// 单个文件最大大小（字节），0 表示不切分
    #[default(16 * 1024 * 1024)]
    pub max_size: u64,

    /// 保留的备份数量: bot.log.1 .. bot.log.N，0 表示不切分
    #[default(5)]
    pub backup_count: usize,
}

/// 当前文件信息
struct CurrentFile {
    file: tokio::fs::File,
    size: u64,
}

/// 按大小滚动的文件输出器
///
/// 写入后大小达到 `max_size` 时，`bot.log` 依次改名为 `bot.log.1`，
/// 已有的 `bot.log.N` 后移一位，超出 `backup_count` 的最旧文件被删除。
/// 文件在第一次写入时打开，父目录不存在时自动创建。
pub struct RollingFileAppender {
    config: RollingFileAppenderConfig,
    path: PathBuf,
    current: Mutex<Option<CurrentFile>>,
}

impl RollingFileAppender {
    pub fn new(config: RollingFileAppenderConfig) -> Self {
        let path = PathBuf::from(&config.file_path);
        Self {
            config,
            path,
            current: Mutex::new(None),
        }
    }

    /// 当前日志文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 第 index 个备份文件的路径
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name: OsString = self.path.clone().into_os_string();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    async fn open(&self) -> Result<CurrentFile> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let size = file.metadata().await?.len();

        Ok(CurrentFile { file, size })
    }

    fn should_rollover(&self, current_size: u64, incoming: u64) -> bool {
        self.config.max_size > 0
            && self.config.backup_count > 0
            && current_size > 0
            && current_size + incoming >= self.config.max_size
    }

    async fn rotate(&self) -> Result<()> {
        ignore_not_found(tokio::fs::remove_file(self.backup_path(self.config.backup_count)).await)?;
        for index in (1..self.config.backup_count).rev() {
            ignore_not_found(
                tokio::fs::rename(self.backup_path(index), self.backup_path(index + 1)).await,
            )?;
        }
        ignore_not_found(tokio::fs::rename(&self.path, self.backup_path(1)).await)?;

        Ok(())
    }
}

fn ignore_not_found(result: std::io::Result<()>) -> std::io::Result<()> {
    match result {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[async_trait::async_trait]
impl LogAppender for RollingFileAppender {
    async fn append(&self, formatted_message: &str) -> Result<()> {
        let mut guard = self.current.lock().await;
        let mut current = match guard.take() {
            Some(current) => current,
            None => self.open().await?,
        };

        let incoming = formatted_message.len() as u64 + 1;
        if self.should_rollover(current.size, incoming) {
            current.file.flush().await?;
            drop(current);
            self.rotate().await?;
            current = self.open().await?;
        }

        current.file.write_all(formatted_message.as_bytes()).await?;
        current.file.write_all(b"\n").await?;
        current.file.flush().await?;
        current.size += incoming;

        *guard = Some(current);
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        let mut guard = self.current.lock().await;
        if let Some(current) = guard.as_mut() {
            current.file.flush().await?;
        }
        Ok(())
    }
}

crate::impl_from!(RollingFileAppenderConfig => RollingFileAppender);
crate::impl_box_from!(RollingFileAppender => dyn LogAppender);
