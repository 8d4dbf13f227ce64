use feeder_hardware::{SimulatedIndicator, SimulatedOpto, SimulatedTensionSwitch};
use feeder_traits::{Indicator, OptoSensor, TensionSwitch};
use rstest::rstest;

#[rstest]
#[case::forward(SimulatedOpto::forward(), 900, 800, 850)]
#[case::backward(SimulatedOpto::backward(), 300, 200, 250)]
fn profiles_cross_each_calibrated_threshold(
    #[case] mut opto: SimulatedOpto,
    #[case] coarse: u16,
    #[case] overshoot: u16,
    #[case] settle: u16,
) {
    // One pip of readings, in table order: below coarse then above it, above
    // the overshoot boundary then back under it, and finally past settle.
    let pip: Vec<u16> = (0..5).map(|_| opto.read().unwrap()).collect();

    assert!(pip[0] <= coarse && pip[1] > coarse);
    assert!(pip[2] > overshoot && pip[3] <= overshoot);
    assert!(pip[4] > settle);

    // The waveform realigns for the next pip.
    let next: Vec<u16> = (0..5).map(|_| opto.read().unwrap()).collect();
    assert_eq!(pip, next);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(5)]
fn switch_trips_after_the_configured_winds(#[case] winds: u32) {
    let mut switch = SimulatedTensionSwitch::new(winds);
    for _ in 0..winds {
        assert!(!switch.is_tensioned().unwrap());
    }
    assert!(switch.is_tensioned().unwrap());
}

#[test]
fn indicator_remembers_its_state() {
    let mut led = SimulatedIndicator::new();
    assert!(!led.is_active());
    led.set_active(true).unwrap();
    assert!(led.is_active());
    led.set_active(false).unwrap();
    assert!(!led.is_active());
}
