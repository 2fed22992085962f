use clap::Parser;
use room_pointer::args::Args;
use room_pointer::display::Kiss3dDisplay;

fn main() -> anyhow::Result<()> {
    room_pointer::launch(Args::parse(), Kiss3dDisplay::new)
}
