#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Moves by a signed offset inside a `width` x `height` area.
    ///
    /// With `wrap` the result folds around the edges like a torus, otherwise positions
    /// falling outside the area yield `None`.
    pub fn offset(
        self,
        dx: isize,
        dy: isize,
        width: usize,
        height: usize,
        wrap: bool,
    ) -> Option<Self> {
        Some(Self {
            x: offset_axis(self.x, dx, width, wrap)?,
            y: offset_axis(self.y, dy, height, wrap)?,
        })
    }
}

fn offset_axis(pos: usize, delta: isize, len: usize, wrap: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }

    let moved = pos as isize + delta;

    if wrap {
        Some(moved.rem_euclid(len as isize) as usize)
    } else if moved < 0 || moved >= len as isize {
        None
    } else {
        Some(moved as usize)
    }
}

impl From<[usize; 2]> for Position {
    fn from(value: [usize; 2]) -> Self {
        Self {
            x: value[0],
            y: value[1],
        }
    }
}

impl From<(usize, usize)> for Position {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

impl From<Position> for [usize; 2] {
    fn from(value: Position) -> Self {
        [value.x, value.y]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_bounded_rejects_outside() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.offset(-1, 0, 5, 5, false), None);
        assert_eq!(origin.offset(1, 1, 5, 5, false), Some(Position::new(1, 1)));
        assert_eq!(Position::new(4, 4).offset(1, 0, 5, 5, false), None);
    }

    #[test]
    fn offset_wrapped_folds_around() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.offset(-1, -1, 5, 3, true), Some(Position::new(4, 2)));
        assert_eq!(Position::new(4, 2).offset(1, 1, 5, 3, true), Some(origin));
    }
}
