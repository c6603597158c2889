/// Decide whether the screen should be on.
///
/// While the idle timer is suppressed (advertising) the screen never
/// times out; otherwise it turns off after `auto_off_timeout_secs` without
/// pad activity.
pub fn screen_should_be_on(
    idle_timer_suppressed: bool,
    auto_off_enabled: bool,
    idle_secs: u64,
    auto_off_timeout_secs: u64,
) -> bool {
    if idle_timer_suppressed {
        return true;
    }

    if auto_off_enabled && idle_secs >= auto_off_timeout_secs {
        return false;
    }

    true
}
