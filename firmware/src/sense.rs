// Voltage, current and temperature sense inputs on ADC1

use esp_hal::analog::adc::{Adc, AdcConfig, AdcPin, Attenuation};
use esp_hal::gpio::GpioPin;
use esp_hal::peripherals::ADC1;
use esp_hal::Blocking;
use shared::peripheral::{AnalogInput, Channel};

pub struct Sense {
    adc: Adc<'static, ADC1, Blocking>,
    voltage: AdcPin<GpioPin<0>, ADC1>,
    current: AdcPin<GpioPin<1>, ADC1>,
    temperature: AdcPin<GpioPin<3>, ADC1>,
}

impl Sense {
    pub fn new(adc1: ADC1, voltage: GpioPin<0>, current: GpioPin<1>, temperature: GpioPin<3>) -> Self {
        // Raw counts, 11 dB covers the full divider output
        let mut config = AdcConfig::new();
        let voltage = config.enable_pin(voltage, Attenuation::_11dB);
        let current = config.enable_pin(current, Attenuation::_11dB);
        let temperature = config.enable_pin(temperature, Attenuation::_11dB);

        Self {
            adc: Adc::new(adc1, config),
            voltage,
            current,
            temperature,
        }
    }
}

impl AnalogInput for Sense {
    fn read_channel(&mut self, channel: Channel) -> u16 {
        // read_oneshot only fails with WouldBlock
        let reading = match channel {
            Channel::Voltage => nb::block!(self.adc.read_oneshot(&mut self.voltage)),
            Channel::Current => nb::block!(self.adc.read_oneshot(&mut self.current)),
            Channel::Temperature => nb::block!(self.adc.read_oneshot(&mut self.temperature)),
        };
        reading.unwrap_or(0)
    }
}
