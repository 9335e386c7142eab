//! Simulated core array.
//!
//! A physical model of the 16x16 core grid with two bit-planes, driven
//! through the same [`Actuators`] interface as the real board. It lets the
//! sequencer, the read/write operations and the diagnostics run without
//! hardware, and it fails the same way real cores do when the pulse protocol
//! is wrong (wrong direction, missing inhibit, too-short saturation).
//!
//! ## Model
//!
//! Each bridge carries a signed unit current: +1 in direction 1, -1 in
//! direction 2, 0 when off. The selected X line and Y line are taken from the
//! address bus. A core's field is the sum of the currents threading it,
//! weighted by the winding sense:
//!
//! | Winding | Sense |
//! |---------|-------|
//! | X       | +1 where `x + y` is odd, -1 otherwise (checkerboard) |
//! | Y       | +1 everywhere |
//! | Inhibit | +1 on odd rows, -1 on even rows (per plane) |
//!
//! A core switches to the sign of its field once `|field| >= 2` has been held
//! for [`SimConfig::switching_quanta`] of simulated time. Half-select fields
//! (`|field| <= 1`) never disturb a core.
//!
//! ## Sense latch
//!
//! While the latch reset line is low the latch is held clear. Once it is high,
//! any core switching in plane *p* sets sense bit *p* until the next reset.

use tracing::{event, Level};

use super::Actuators;
use crate::address::{decode, from_xy, CORE_COUNT, GRID_SIZE};
use crate::bridge::{Bridge, BridgeState, Plane};
use crate::memory::CoreMemory;
use crate::sequencer::SATURATION_QUANTA;
use crate::timing::VirtualClock;

/// Tunable physics of the simulated array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Time (in quanta) a full-select field must be held to switch a core.
    pub switching_quanta: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            switching_quanta: SATURATION_QUANTA,
        }
    }
}

/// A full-select field currently applied to one core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Drive {
    plane: Plane,
    address: u8,
    polarity: bool,
    since: u64,
}

/// Simulated 16x16x2 core array.
///
/// # Examples
///
/// ```rust
/// use coremem::{CoreBus, SimulatedMemory};
///
/// let mut memory = SimulatedMemory::simulated();
/// memory.write(0x42, 0b10);
/// assert_eq!(memory.read(0x42), 0b10);
/// assert_eq!(memory.actuators().value(0x42), 0b10);
/// ```
pub struct SimulatedArray {
    config: SimConfig,
    clock: VirtualClock,

    // planes[p][address] is true when the core holds a one
    planes: [[bool; CORE_COUNT]; 2],

    bridges: [BridgeState; 4],
    address_bus: u8,
    latch_reset: bool,
    sensed: u8,

    pending: Vec<Drive>,
    switches: u64,
    strobes: usize,
    on_strobe: Option<Box<dyn Fn()>>,
}

impl SimulatedArray {
    /// A cleared array observing `clock`.
    ///
    /// `clock` must be a clone of the [`VirtualClock`] handed to the
    /// sequencer as its delay: the array measures how long each field is held
    /// on that clock, and on any other clock no core ever switches.
    /// [`SimulatedMemory::simulated`](CoreMemory::simulated) wires this up.
    pub fn with_clock(clock: VirtualClock, config: SimConfig) -> Self {
        Self {
            config,
            clock,
            planes: [[false; CORE_COUNT]; 2],
            bridges: [BridgeState::NoConductAlt; 4],
            address_bus: 0,
            latch_reset: false,
            sensed: 0,
            pending: Vec::new(),
            switches: 0,
            strobes: 0,
            on_strobe: None,
        }
    }

    /// The clock this array observes.
    pub fn clock(&self) -> &VirtualClock {
        &self.clock
    }

    /// Physics in use.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// State of one core.
    pub fn core(&self, address: u8, plane: Plane) -> bool {
        self.planes[plane.index()][address as usize]
    }

    /// Force a core into a state without pulsing it.
    pub fn set_core(&mut self, address: u8, plane: Plane, one: bool) {
        self.planes[plane.index()][address as usize] = one;
    }

    /// Both planes of a core as a 2-bit value.
    pub fn value(&self, address: u8) -> u8 {
        Plane::ALL
            .iter()
            .filter(|plane| self.core(address, **plane))
            .fold(0, |acc, plane| acc | plane.bit())
    }

    /// Current state of a bridge driver.
    pub fn bridge(&self, bridge: Bridge) -> BridgeState {
        self.bridges[bridge.index()]
    }

    /// True when no driver is conducting.
    pub fn all_released(&self) -> bool {
        self.bridges.iter().all(|state| !state.is_conducting())
    }

    /// Value last driven on the address bus.
    pub fn address_bus(&self) -> u8 {
        self.address_bus
    }

    /// Number of core flips since creation.
    pub fn switch_count(&self) -> u64 {
        self.switches
    }

    /// Number of debug strobes seen.
    pub fn debug_strobes(&self) -> usize {
        self.strobes
    }

    /// Call `callback` on every debug strobe.
    pub fn set_strobe_callback<F>(&mut self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.on_strobe = Some(Box::new(callback));
    }

    /// Full-select fields produced by the current line state.
    fn saturating_fields(&self) -> Vec<(Plane, u8, bool)> {
        let ix = self.bridge(Bridge::X).current();
        let iy = self.bridge(Bridge::Y).current();
        let mut fields = Vec::new();

        // Inhibit alone is only ever a half-select field
        if ix == 0 && iy == 0 {
            return fields;
        }

        let line = decode(self.address_bus);

        // Only cores on a conducting select line can see a full-select field
        let column = (0..GRID_SIZE)
            .filter(|_| ix != 0)
            .map(|y| (line.x, y));
        let row = (0..GRID_SIZE)
            .filter(|&x| iy != 0 && !(ix != 0 && x == line.x))
            .map(|x| (x, line.y));

        for (x, y) in column.chain(row) {
            let on_x = ix != 0 && x == line.x;
            let on_y = iy != 0 && y == line.y;

            let x_sense: i8 = if (x + y) % 2 != 0 { 1 } else { -1 };
            let inhibit_sense: i8 = if y % 2 != 0 { 1 } else { -1 };
            let select = (if on_x { x_sense * ix } else { 0 }) + (if on_y { iy } else { 0 });

            for plane in Plane::ALL {
                let ih = self.bridge(Bridge::inhibit(plane)).current();
                let field = select + inhibit_sense * ih;
                if field.abs() >= 2 {
                    fields.push((plane, from_xy(x, y), field > 0));
                }
            }
        }

        fields
    }

    /// Re-evaluate fields after a line change or before sampling.
    fn settle(&mut self) {
        let now = self.clock.now();
        let switching = u64::from(self.config.switching_quanta);
        let fields = self.saturating_fields();

        let previous = std::mem::take(&mut self.pending);
        let mut pending = Vec::with_capacity(fields.len());

        for drive in previous {
            let held = now - drive.since;
            if held >= switching {
                self.flip(drive.plane, drive.address, drive.polarity);
            }
            if fields.contains(&(drive.plane, drive.address, drive.polarity)) {
                pending.push(drive);
            }
        }

        for (plane, address, polarity) in fields {
            let known = pending
                .iter()
                .any(|d| d.plane == plane && d.address == address && d.polarity == polarity);
            if !known {
                pending.push(Drive {
                    plane,
                    address,
                    polarity,
                    since: now,
                });
            }
        }

        self.pending = pending;
    }

    fn flip(&mut self, plane: Plane, address: u8, polarity: bool) {
        let core = &mut self.planes[plane.index()][address as usize];
        if *core == polarity {
            return;
        }
        *core = polarity;
        self.switches += 1;

        if self.latch_reset {
            self.sensed |= plane.bit();
        }

        event!(
            Level::TRACE,
            address,
            plane = plane.index(),
            one = polarity,
            "simulated core switched"
        );
    }
}

impl Actuators for SimulatedArray {
    fn set_bridge(&mut self, bridge: Bridge, state: BridgeState) {
        self.settle();
        self.bridges[bridge.index()] = state;
        self.settle();
    }

    fn set_address_bus(&mut self, address: u8) {
        self.settle();
        self.address_bus = address;
        self.settle();
    }

    fn set_latch_reset(&mut self, level: bool) {
        self.settle();
        self.latch_reset = level;
        if !level {
            self.sensed = 0;
        }
    }

    fn strobe_debug_event(&mut self) {
        self.strobes += 1;
        if let Some(ref callback) = self.on_strobe {
            callback();
        }
    }

    fn sample_sense(&mut self) -> u8 {
        self.settle();
        self.sensed
    }
}

/// Core memory driving a simulated array on simulated time.
pub type SimulatedMemory = CoreMemory<SimulatedArray, VirtualClock>;

impl CoreMemory<SimulatedArray, VirtualClock> {
    /// A cleared simulated memory with default physics.
    pub fn simulated() -> Self {
        Self::simulated_with(SimConfig::default())
    }

    /// A cleared simulated memory with custom physics.
    pub fn simulated_with(config: SimConfig) -> Self {
        let clock = VirtualClock::new();
        CoreMemory::new(SimulatedArray::with_clock(clock.clone(), config), clock)
    }
}
