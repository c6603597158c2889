use crate::ui::SessionCommand;

/// Action of the SELECT button: toggle broadcasting.
pub fn select_action(advertising: bool) -> SessionCommand {
    if advertising {
        SessionCommand::StopAdvertising
    } else {
        SessionCommand::StartAdvertising
    }
}
