use libgame::Color;

/// A caller-owned drawing surface with one slot per grid cell.
pub struct RenderFrame {
    pub width: usize,
    pub height: usize,
    pub buffer: Vec<Option<Color>>,
}

impl RenderFrame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buffer: vec![None; width * height],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }

        self.buffer[x + y * self.width]
    }

    pub fn draw_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.buffer[x + y * self.width] = Some(color);
    }

    pub fn clear(&mut self) {
        self.buffer.fill(None);
    }
}
