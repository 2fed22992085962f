use crate::config::WindowConfig;
use crate::state::PointerColor;
use kiss3d::scene::PlanarSceneNode;
use kiss3d::text::Font;
use kiss3d::window::Window;
use log::*;
use nalgebra as na;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLine {
    Connection,
    Version,
    Telemetry,
    Calibration,
}

impl StatusLine {
    const ALL: [StatusLine; 4] = [
        StatusLine::Connection,
        StatusLine::Version,
        StatusLine::Telemetry,
        StatusLine::Calibration,
    ];

    fn index(self) -> usize {
        match self {
            StatusLine::Connection => 0,
            StatusLine::Version => 1,
            StatusLine::Telemetry => 2,
            StatusLine::Calibration => 3,
        }
    }
}

/// Local rendering surface of the pointer.
pub trait PointerDisplay {
    /// Drawable size in pixels.
    fn viewport(&self) -> (f32, f32);
    /// Position in pixels from the top left corner.
    fn show_pointer(&mut self, position: na::Point2<f32>, color: &PointerColor);
    fn hide_pointer(&mut self);
    fn set_status(&mut self, line: StatusLine, text: &str);
    /// Presents the frame. Returns false once the surface is gone.
    fn present(&mut self) -> bool;
}

/// Maps engine coordinates (v grows upwards) to pixels from the top left.
pub fn screen_position(u: f32, v: f32, viewport: (f32, f32)) -> na::Point2<f32> {
    let (width, height) = viewport;
    na::Point2::new(u * width, (1.0 - v) * height)
}

pub struct Kiss3dDisplay {
    window: Window,
    pointer: PlanarSceneNode,
    font: Rc<Font>,
    status: [String; 4],
}

impl Kiss3dDisplay {
    pub fn new(settings: &WindowConfig) -> Self {
        let mut window = Window::new_with_size(&settings.title, settings.width, settings.height);
        window.set_background_color(0.0, 0.0, 0.0);
        let mut pointer = window.add_circle(settings.pointer_radius);
        pointer.set_visible(false);
        Self {
            window,
            pointer,
            font: Font::default(),
            status: Default::default(),
        }
    }
}

impl PointerDisplay for Kiss3dDisplay {
    fn viewport(&self) -> (f32, f32) {
        (self.window.width() as f32, self.window.height() as f32)
    }

    fn show_pointer(&mut self, position: na::Point2<f32>, color: &PointerColor) {
        // planar scene has its origin at the window center with y up
        let (width, height) = self.viewport();
        let [r, g, b] = color.as_unit_rgb();
        self.pointer.set_local_translation(na::Translation2::new(
            position.x - width / 2.0,
            height / 2.0 - position.y,
        ));
        self.pointer.set_color(r, g, b);
        self.pointer.set_visible(true);
    }

    fn hide_pointer(&mut self) {
        self.pointer.set_visible(false);
    }

    fn set_status(&mut self, line: StatusLine, text: &str) {
        self.status[line.index()] = text.to_owned();
    }

    fn present(&mut self) -> bool {
        let grey = na::Point3::new(0.7, 0.7, 0.7);
        for (row, line) in StatusLine::ALL.iter().enumerate() {
            self.window.draw_text(
                &self.status[line.index()],
                &na::Point2::new(10.0, 10.0 + row as f32 * 40.0),
                40.0,
                &self.font,
                &grey,
            );
        }
        self.window.render()
    }
}

/// Display for running without a window, status changes go to the log.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    pub viewport: (f32, f32),
    pub pointer: Option<(na::Point2<f32>, PointerColor)>,
    pub status: [String; 4],
}

impl HeadlessDisplay {
    pub fn new(settings: &WindowConfig) -> Self {
        Self {
            viewport: (settings.width as f32, settings.height as f32),
            ..Default::default()
        }
    }

    pub fn status(&self, line: StatusLine) -> &str {
        &self.status[line.index()]
    }
}

impl PointerDisplay for HeadlessDisplay {
    fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    fn show_pointer(&mut self, position: na::Point2<f32>, color: &PointerColor) {
        self.pointer = Some((position, *color));
    }

    fn hide_pointer(&mut self) {
        self.pointer = None;
    }

    fn set_status(&mut self, line: StatusLine, text: &str) {
        let slot = &mut self.status[line.index()];
        if slot.as_str() != text {
            match line {
                StatusLine::Telemetry => trace!("{}", text),
                _ => info!("{}", text),
            }
            *slot = text.to_owned();
        }
    }

    fn present(&mut self) -> bool {
        true
    }
}
