/// Represents a timer inside of the chip infrastruture, it will count down to
/// zero from what ever number given, by one step each time it is ticked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    /// will store the value of the timer
    value: u8,
}

impl Timer {
    /// Will create a new timer with the given value.
    pub fn new(value: u8) -> Self {
        Self { value }
    }

    /// Will set the value from which the timer shall count down from.
    pub fn set_value(&mut self, value: u8) {
        self.value = value;
    }

    /// Will get the value that the counter is currently at.
    pub fn get_value(&self) -> u8 {
        self.value
    }

    /// Is the timer still counting down.
    pub fn is_active(&self) -> bool {
        self.value > 0
    }

    /// Will count the timer down by one, if it is still active.
    /// Returns if the timer was active before the tick.
    pub fn tick(&mut self) -> bool {
        let active = self.is_active();
        if active {
            self.value -= 1;
        }
        active
    }
}
