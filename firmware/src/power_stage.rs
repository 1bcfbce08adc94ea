// Converter PWM on LEDC and the relay drivers

use esp_hal::gpio::{Level, Output};
use esp_hal::ledc::channel::{Channel, ChannelHW};
use esp_hal::ledc::LowSpeed;
use shared::peripheral::{PowerStage, Relay};
use shared::state::CellId;

/// 9-bit duty register
pub const DUTY_MAX: u16 = 511;

pub struct Board {
    pwm: Channel<'static, LowSpeed>,
    charge: Output<'static>,
    discharge: Output<'static>,
    main: Output<'static>,
    cells: [Output<'static>; CellId::COUNT as usize],
}

impl Board {
    pub fn new(
        pwm: Channel<'static, LowSpeed>,
        charge: Output<'static>,
        discharge: Output<'static>,
        main: Output<'static>,
        cells: [Output<'static>; CellId::COUNT as usize],
    ) -> Self {
        Self {
            pwm,
            charge,
            discharge,
            main,
            cells,
        }
    }

    fn relay_pin(&mut self, relay: Relay) -> &mut Output<'static> {
        match relay {
            Relay::Charge => &mut self.charge,
            Relay::Discharge => &mut self.discharge,
            Relay::Main => &mut self.main,
            Relay::Cell(cell) => &mut self.cells[usize::from(cell.number() - 1)],
        }
    }
}

impl PowerStage for Board {
    fn set_duty(&mut self, duty: u16) {
        self.pwm.set_duty_hw(u32::from(duty.min(DUTY_MAX)));
    }

    fn set_relay(&mut self, relay: Relay, on: bool) {
        self.relay_pin(relay).set_level(Level::from(on));
    }
}
