//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext};

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) -> Result<(), UiError> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => Err(UiError::from_message(
            UiErrorContext::General,
            "UI command queue is full; please retry",
        )),
        Err(TrySendError::Disconnected(_)) => Err(UiError::from_message(
            UiErrorContext::BackendStartup,
            "Backend command processor disconnected; restart the app",
        )),
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;

    use super::*;
    use crate::controller::events::UiErrorCategory;

    #[test]
    fn queues_commands_while_there_is_room() {
        let (cmd_tx, cmd_rx) = bounded(1);
        dispatch_backend_command(&cmd_tx, BackendCommand::Analyze).expect("queued");
        assert!(matches!(cmd_rx.try_recv(), Ok(BackendCommand::Analyze)));
    }

    #[test]
    fn full_queue_is_reported() {
        let (cmd_tx, _cmd_rx) = bounded(1);
        dispatch_backend_command(&cmd_tx, BackendCommand::Reset).expect("first fits");
        let err = dispatch_backend_command(&cmd_tx, BackendCommand::Analyze).expect_err("full");
        assert_eq!(err.category(), UiErrorCategory::Transport);
    }

    #[test]
    fn disconnected_backend_is_reported() {
        let (cmd_tx, cmd_rx) = bounded(1);
        drop(cmd_rx);
        let err = dispatch_backend_command(&cmd_tx, BackendCommand::Reset).expect_err("gone");
        assert_eq!(err.context(), UiErrorContext::BackendStartup);
    }
}
