#[cfg(feature = "std")]
mod tests {
    extern crate std;
    use embassy_futures::select::{select, Either};
    use embassy_time::{Duration, Timer};
    use futures::executor::block_on;
    use iot01a_telemetry::{
        config::ConfigError,
        domain::telemetry::{FormatError, TelemetryData},
        drivers::sensors::{hts221, lps22hb, SensorError},
        telemetry::halt,
        testutil::*,
        traits::mqtt::{PublishError, QoS},
        DriverConfig, FailurePolicy, Stage, TelemetryConfig, TelemetryError, TelemetryPublisher,
    };

    fn setup() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn config() -> TelemetryConfig<'static> {
        TelemetryConfig {
            interval_ms: 1,
            sensor: DriverConfig {
                settle_ms: 5,
                poll_timeout_ms: Some(50),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_sample_and_publish() {
        setup();
        let mut bus = TestBus::board();
        let mut client = TestPublisher::new();
        block_on(async {
            let mut publisher = TelemetryPublisher::initialize(&mut bus, &mut client, config())
                .await
                .unwrap();
            assert_eq!(20.0, publisher.calibration().temperature.t0_degc.raw_value());
            publisher.connect().await.unwrap();

            let sample = publisher.sample().await.unwrap();
            assert_eq!(20.0, sample.temperature.raw_value());
            assert_eq!(50.0, sample.humidity);
            assert_eq!(1013.25, sample.pressure);

            publisher.publish(&sample).await.unwrap();
            publisher.publish(&sample).await.unwrap();
        });

        assert!(client.is_connected());
        let published = client.published();
        assert_eq!(2, published.len());
        assert_eq!("arm/edx/lab4", published[0].topic);
        assert_eq!(QoS::AtMostOnce, published[0].qos);
        assert_eq!(1, published[0].packet_id);
        assert_eq!(2, published[1].packet_id);

        let data = TelemetryData::parse(&published[0].payload).unwrap();
        assert_eq!(
            TelemetryData {
                temperature: 20.0,
                humidity: 50.0,
                pressure: 1013.25,
            },
            data
        );

        // two power-state writes per sensor, one start bit per conversion
        assert_eq!(2, bus.writes_to(hts221::ADDR, 0x20).len());
        assert_eq!(2, bus.writes_to(lps22hb::ADDR, 0x10).len());
        assert_eq!(1, bus.writes_to(hts221::ADDR, 0x21).len());
        assert_eq!(1, bus.writes_to(lps22hb::ADDR, 0x11).len());
    }

    #[test]
    fn test_configured_topic_and_offset() {
        setup();
        let json = br#"{"topic":"site/lab/env","temperature-offset":0.0,"interval-ms":1,"sensor":{"settle-ms":1}}"#;
        let config = TelemetryConfig::from_json(json).unwrap();
        let mut bus = TestBus::board();
        let mut client = TestPublisher::new();
        block_on(async {
            let mut publisher = TelemetryPublisher::initialize(&mut bus, &mut client, config)
                .await
                .unwrap();
            publisher.connect().await.unwrap();
            let sample = publisher.sample().await.unwrap();
            assert_eq!(25.0, sample.temperature.raw_value());
            publisher.publish(&sample).await.unwrap();
        });
        assert_eq!("site/lab/env", client.published()[0].topic);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        setup();
        let mut bus = TestBus::board();
        let result = block_on(TelemetryPublisher::initialize(
            &mut bus,
            TestPublisher::new(),
            TelemetryConfig {
                interval_ms: 0,
                ..config()
            },
        ));
        assert!(matches!(
            result,
            Err(TelemetryError::Config(ConfigError::ZeroInterval))
        ));
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn test_initialize_names_failing_stage() {
        setup();
        let mut bus = TestBus::board();
        bus.fail_on(hts221::ADDR, 0x30);
        let result = block_on(TelemetryPublisher::initialize(
            &mut bus,
            TestPublisher::new(),
            config(),
        ));
        match result {
            Err(e) => {
                assert_eq!(
                    TelemetryError::Sensor(
                        Stage::Calibrate,
                        SensorError::Bus(TestBusError::Injected)
                    ),
                    e
                );
                e.report();
            }
            Ok(_) => panic!("calibration fault not reported"),
        }
    }

    #[test]
    fn test_initialize_names_failing_device() {
        setup();
        let cases = [
            (hts221::ADDR, 0x20, Stage::InitializeHts221),
            (lps22hb::ADDR, 0x10, Stage::InitializeLps22hb),
        ];
        for (address, register, stage) in cases {
            let mut bus = TestBus::board();
            bus.fail_on(address, register);
            let result = block_on(TelemetryPublisher::initialize(
                &mut bus,
                TestPublisher::new(),
                config(),
            ));
            match result {
                Err(e) => {
                    assert_eq!(
                        TelemetryError::Sensor(stage, SensorError::Bus(TestBusError::Injected)),
                        e
                    );
                    assert_eq!(Some(stage), e.stage());
                }
                Ok(_) => panic!("initialization fault not reported"),
            }
        }

        let mut bus = TestBus::new().with_device(TestDevice::hts221());
        let result = block_on(TelemetryPublisher::initialize(
            &mut bus,
            TestPublisher::new(),
            config(),
        ));
        match result {
            Err(e) => assert_eq!(
                TelemetryError::Sensor(
                    Stage::InitializeLps22hb,
                    SensorError::Bus(TestBusError::NoDevice)
                ),
                e
            ),
            Ok(_) => panic!("missing LPS22HB not reported"),
        }
    }

    #[test]
    fn test_degenerate_calibration_is_not_published() {
        setup();
        let mut calibration = HTS221_CALIBRATION;
        // T1_OUT equal to T0_OUT
        calibration[14] = calibration[12];
        calibration[15] = calibration[13];
        let mut bus = TestBus::new()
            .with_device(TestDevice::hts221().with_calibration(calibration))
            .with_device(TestDevice::lps22hb());
        let mut client = TestPublisher::new();
        block_on(async {
            let mut publisher = TelemetryPublisher::initialize(&mut bus, &mut client, config())
                .await
                .unwrap();
            assert!(publisher.calibration().is_degenerate());
            publisher.connect().await.unwrap();

            let sample = publisher.sample().await.unwrap();
            assert!(!sample.temperature.raw_value().is_finite());
            let e = publisher.publish(&sample).await.unwrap_err();
            assert_eq!(TelemetryError::Format(FormatError::NonFinite), e);
            assert_eq!(Some(Stage::Format), e.stage());
        });

        assert_eq!(0, client.attempts());
        assert!(client.published().is_empty());
    }

    #[test]
    fn test_publish_requires_connection() {
        setup();
        let mut bus = TestBus::board();
        block_on(async {
            let mut publisher =
                TelemetryPublisher::initialize(&mut bus, TestPublisher::new(), config())
                    .await
                    .unwrap();
            let sample = publisher.sample().await.unwrap();
            assert_eq!(
                Err(TelemetryError::Publish(Stage::Publish, PublishError::NotConnected)),
                publisher.publish(&sample).await
            );

            let (_, client) = publisher.release();
            assert!(client.published().is_empty());
        });
    }

    #[test]
    fn test_connect_refused() {
        setup();
        let mut bus = TestBus::board();
        block_on(async {
            let mut publisher = TelemetryPublisher::initialize(
                &mut bus,
                TestPublisher::new().refuse_connect(),
                config(),
            )
            .await
            .unwrap();
            assert_eq!(
                Err(TelemetryError::Publish(Stage::Connect, PublishError::Rejected(0x87))),
                publisher.connect().await
            );
        });
    }

    #[test]
    fn test_halt_policy_stops_at_first_failure() {
        setup();
        let mut bus = TestBus::board();
        let mut client = TestPublisher::new().fail_attempt(2);
        let result = block_on(async {
            let mut publisher = TelemetryPublisher::initialize(&mut bus, &mut client, config())
                .await
                .unwrap();
            publisher.connect().await.unwrap();
            publisher.run().await
        });

        assert!(matches!(
            result,
            Err(TelemetryError::Publish(Stage::Publish, PublishError::Network))
        ));
        assert_eq!(3, client.attempts());
        assert_eq!(2, client.published().len());
    }

    #[test]
    fn test_halt_policy_on_sensor_failure() {
        setup();
        let mut bus = TestBus::new()
            .with_device(TestDevice::hts221())
            .with_device(TestDevice::lps22hb().never_ready());
        let mut client = TestPublisher::new();
        let result = block_on(async {
            let mut publisher = TelemetryPublisher::initialize(&mut bus, &mut client, config())
                .await
                .unwrap();
            publisher.connect().await.unwrap();
            publisher.run().await
        });

        assert!(matches!(
            result,
            Err(TelemetryError::Sensor(Stage::ReadPressure, SensorError::Timeout))
        ));
        assert_eq!(0, client.attempts());
    }

    #[test]
    fn test_skip_cycle_policy_continues() {
        setup();
        let mut bus = TestBus::board();
        let mut client = TestPublisher::new().fail_attempt(0);
        block_on(async {
            let mut publisher = TelemetryPublisher::initialize(
                &mut bus,
                &mut client,
                TelemetryConfig {
                    failure_policy: FailurePolicy::SkipCycle,
                    ..config()
                },
            )
            .await
            .unwrap();
            publisher.connect().await.unwrap();

            match select(publisher.run(), Timer::after(Duration::from_millis(200))).await {
                Either::First(result) => panic!("run returned {:?}", result),
                Either::Second(_) => {}
            }
        });

        assert!(client.attempts() >= 2);
        assert_eq!(client.attempts() - 1, client.published().len());
        assert_eq!(2, client.published()[0].packet_id);
    }

    #[test]
    fn test_run_waits_between_cycles() {
        setup();
        let mut bus = TestBus::board();
        let mut client = TestPublisher::new();
        block_on(async {
            let mut publisher = TelemetryPublisher::initialize(
                &mut bus,
                &mut client,
                TelemetryConfig {
                    interval_ms: 100,
                    ..config()
                },
            )
            .await
            .unwrap();
            publisher.connect().await.unwrap();
            let _ = select(publisher.run(), Timer::after(Duration::from_millis(150))).await;
        });

        assert_eq!(2, client.published().len());
    }

    #[test]
    fn test_halt_parks_forever() {
        setup();
        let error: TelemetryError<TestBusError> =
            TelemetryError::Publish(Stage::Publish, PublishError::Network);
        let parked = block_on(select(
            halt(error),
            Timer::after(Duration::from_millis(20)),
        ));
        assert!(matches!(parked, Either::Second(())));
    }
}
