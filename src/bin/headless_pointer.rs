use clap::Parser;
use room_pointer::args::Args;
use room_pointer::display::HeadlessDisplay;

/// Same pipeline as the windowed pointer, status changes are logged instead
/// of drawn. Useful next to a remote viewer.
fn main() -> anyhow::Result<()> {
    room_pointer::launch(Args::parse(), HeadlessDisplay::new)
}
