use crate::biz_service::avatar_service::AvatarService;
use crate::biz_service::cmd_service::{CmdEvent, CmdService};
use crate::biz_service::friend_service::UserFriendService;
use common::config::AppConfig;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// 旁路任务：请求返回后在工作协程里执行
/// 互相之间无顺序保证，失败只记日志不重试
#[derive(Debug, Clone)]
pub enum SideTask {
    /// 头像抓取入库
    AvatarIngest { uid: String, avatar_url: String },
    /// 新用户欢迎消息
    WelcomeMessage { uid: String, login_ip: String },
    /// 好友事件扇出
    FriendNotify { uid: String, event: CmdEvent },
}

/// 有界任务队列 + 小型工作池
pub struct TaskService {
    tx: mpsc::Sender<SideTask>,
}

impl TaskService {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<SideTask>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// 入队。队列满时丢弃并告警，绝不阻塞调用方
    pub fn dispatch(&self, task: SideTask) -> bool {
        match self.tx.try_send(task) {
            Ok(_) => true,
            Err(TrySendError::Full(task)) => {
                log::warn!("任务队列已满，丢弃任务: {:?}", task);
                false
            }
            Err(TrySendError::Closed(task)) => {
                log::error!("任务队列已关闭，丢弃任务: {:?}", task);
                false
            }
        }
    }

    pub fn init(capacity: usize, workers: usize) {
        let (instance, rx) = Self::new(capacity);
        let rx = Arc::new(Mutex::new(rx));
        for worker_id in 0..workers {
            let rx = rx.clone();
            tokio::spawn(worker_loop(worker_id, rx));
        }
        INSTANCE.set(Arc::new(instance)).unwrap_or_else(|_| panic!("TaskService already initialized"));
    }

    /// 获取单例
    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("TaskService is not initialized").clone()
    }
}

static INSTANCE: OnceCell<Arc<TaskService>> = OnceCell::new();

async fn worker_loop(worker_id: usize, rx: Arc<Mutex<mpsc::Receiver<SideTask>>>) {
    loop {
        let task = { rx.lock().await.recv().await };
        match task {
            Some(task) => {
                if let Err(e) = run_task(task).await {
                    log::error!("旁路任务执行失败 worker={}: {:?}", worker_id, e);
                }
            }
            None => break,
        }
    }
}

async fn run_task(task: SideTask) -> anyhow::Result<()> {
    match task {
        SideTask::AvatarIngest { uid, avatar_url } => {
            AvatarService::get().ingest_avatar(&avatar_url, &uid).await?;
            // 入库成功后通知好友刷新头像，单独排队，不保证先后
            TaskService::get().dispatch(SideTask::FriendNotify { uid: uid.clone(), event: CmdEvent::AvatarUpdate { uid } });
            Ok(())
        }
        SideTask::WelcomeMessage { uid, login_ip } => {
            let content = AppConfig::get().get_business().welcome_message;
            let event = CmdEvent::Welcome { uid: uid.clone(), content, login_ip };
            CmdService::get().send_cmd(&event, &[uid]).await
        }
        SideTask::FriendNotify { uid, event } => UserFriendService::get().notify_friends(&uid, &event).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_drops_when_full() {
        // 容量 1，无消费者：第二次入队丢弃而非阻塞
        let (service, _rx) = TaskService::new(1);
        assert!(service.dispatch(SideTask::WelcomeMessage { uid: "u1".into(), login_ip: "".into() }));
        assert!(!service.dispatch(SideTask::WelcomeMessage { uid: "u2".into(), login_ip: "".into() }));
    }

    #[test]
    fn test_dispatch_drops_when_closed() {
        let (service, rx) = TaskService::new(1);
        drop(rx);
        assert!(!service.dispatch(SideTask::WelcomeMessage { uid: "u1".into(), login_ip: "".into() }));
    }
}
