//! Service-level behaviour of the registry over the in-memory store:
//! referential integrity, the area invariant, document uniqueness,
//! cascade deletes, failed-update idempotence and timestamps.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use agro_core::{
    CropType, DomainError, EntityKind, FarmPatch, ManualClock, NewCrop, NewFarm, NewHarvest,
    NewProducer, ProducerId, ProducerPatch,
};
use agro_registry::{CascadeReport, InMemoryRepository, ReadUnit, Registry, Repository};

fn registry() -> (Registry<InMemoryRepository>, ManualClock) {
    let clock = ManualClock::starting_at(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
    let registry = Registry::new(InMemoryRepository::new(), Arc::new(clock.clone()));
    (registry, clock)
}

fn new_producer(document: &str) -> NewProducer {
    NewProducer {
        name: "João Silva".into(),
        document: document.into(),
    }
}

fn new_farm(producer_id: ProducerId, total: f64, agricultural: f64, vegetation: f64) -> NewFarm {
    NewFarm {
        producer_id,
        name: "Fazenda Boa Vista".into(),
        city: "Ribeirão Preto".into(),
        state: "SP".into(),
        total_area: total,
        agricultural_area: agricultural,
        vegetation_area: vegetation,
    }
}

// -- Producer --

#[test]
fn create_producer_normalizes_document() {
    let (registry, _) = registry();
    let producer = registry
        .producers()
        .create(new_producer("111.444.777-35"))
        .unwrap();
    assert_eq!(producer.document.as_str(), "11144477735");
    assert_eq!(producer.document.formatted(), "111.444.777-35");
    assert_eq!(producer.created_at, producer.updated_at);
    assert_eq!(registry.producers().get(producer.id).unwrap(), producer);
}

#[test]
fn create_producer_rejects_invalid_document() {
    let (registry, _) = registry();
    let err = registry
        .producers()
        .create(new_producer("11111111111"))
        .unwrap_err();
    assert_eq!(err, DomainError::InvalidDocument("11111111111".into()));
    assert!(registry.producers().list().is_empty());
}

#[test]
fn create_producer_rejects_blank_name() {
    let (registry, _) = registry();
    let err = registry
        .producers()
        .create(NewProducer {
            name: "  ".into(),
            document: "11144477735".into(),
        })
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_FIELD");
}

#[test]
fn duplicate_document_on_create_and_update() {
    let (registry, _) = registry();
    let first = registry
        .producers()
        .create(new_producer("11144477735"))
        .unwrap();

    // Same digits, different punctuation.
    let err = registry
        .producers()
        .create(new_producer("111.444.777-35"))
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateDocument(_)));

    let second = registry
        .producers()
        .create(new_producer("11222333000181"))
        .unwrap();
    let err = registry
        .producers()
        .update(
            second.id,
            ProducerPatch {
                document: Some("11144477735".into()),
                ..ProducerPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateDocument(_)));

    // Re-submitting a producer's own document is not a conflict.
    let same = registry
        .producers()
        .update(
            first.id,
            ProducerPatch {
                document: Some("111.444.777-35".into()),
                ..ProducerPatch::default()
            },
        )
        .unwrap();
    assert_eq!(same.document, first.document);
}

#[test]
fn update_producer_applies_only_present_fields() {
    let (registry, clock) = registry();
    let producer = registry
        .producers()
        .create(new_producer("11144477735"))
        .unwrap();

    clock.advance(Duration::minutes(10));
    let updated = registry
        .producers()
        .update(
            producer.id,
            ProducerPatch {
                name: Some("Maria Santos".into()),
                ..ProducerPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Maria Santos");
    assert_eq!(updated.document, producer.document);
    assert_eq!(updated.created_at, producer.created_at);
    assert_eq!(updated.updated_at, producer.created_at + Duration::minutes(10));
}

#[test]
fn empty_patch_leaves_producer_untouched() {
    let (registry, clock) = registry();
    let producer = registry
        .producers()
        .create(new_producer("11144477735"))
        .unwrap();
    clock.advance(Duration::minutes(1));
    let same = registry
        .producers()
        .update(producer.id, ProducerPatch::default())
        .unwrap();
    assert_eq!(same, producer);
}

#[test]
fn update_unknown_producer_is_not_found() {
    let (registry, _) = registry();
    let id = ProducerId::new();
    let err = registry
        .producers()
        .update(id, ProducerPatch::default())
        .unwrap_err();
    assert_eq!(err, DomainError::not_found(EntityKind::Producer, id));
}

#[test]
fn failed_producer_update_is_idempotent() {
    let (registry, clock) = registry();
    let producer = registry
        .producers()
        .create(new_producer("11144477735"))
        .unwrap();
    clock.advance(Duration::minutes(3));

    // Valid name but invalid document: nothing may change.
    let err = registry
        .producers()
        .update(
            producer.id,
            ProducerPatch {
                name: Some("Outro Nome".into()),
                document: Some("11144477734".into()),
            },
        )
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_DOCUMENT");
    assert_eq!(registry.producers().get(producer.id).unwrap(), producer);
}

// -- Farm --

#[test]
fn farm_area_invariant_boundary() {
    let (registry, _) = registry();
    let producer = registry
        .producers()
        .create(new_producer("11144477735"))
        .unwrap();

    let err = registry
        .farms()
        .create(new_farm(producer.id, 500.0, 400.0, 200.0))
        .unwrap_err();
    assert_eq!(
        err,
        DomainError::AreaInvariantViolation {
            agricultural: 400.0,
            vegetation: 200.0,
            total: 500.0,
        }
    );
    assert!(registry.farms().list_all().is_empty());

    let farm = registry
        .farms()
        .create(new_farm(producer.id, 600.0, 400.0, 200.0))
        .unwrap();
    assert_eq!(farm.total_area, 600.0);
    assert_eq!(registry.farms().list_by_producer(producer.id), vec![farm]);
}

#[test]
fn farm_requires_existing_producer() {
    let (registry, _) = registry();
    let ghost = ProducerId::new();
    let err = registry
        .farms()
        .create(new_farm(ghost, 100.0, 10.0, 10.0))
        .unwrap_err();
    assert_eq!(err, DomainError::ProducerNotFound(ghost));
}

#[test]
fn farm_rejects_non_positive_total_area() {
    let (registry, _) = registry();
    let producer = registry
        .producers()
        .create(new_producer("11144477735"))
        .unwrap();
    let err = registry
        .farms()
        .create(new_farm(producer.id, 0.0, 0.0, 0.0))
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_AREA");
}

#[test]
fn farm_state_is_normalized() {
    let (registry, _) = registry();
    let producer = registry
        .producers()
        .create(new_producer("11144477735"))
        .unwrap();
    let mut payload = new_farm(producer.id, 100.0, 50.0, 20.0);
    payload.state = " mg ".into();
    let farm = registry.farms().create(payload).unwrap();
    assert_eq!(farm.state, "MG");
}

#[test]
fn farm_update_checks_effective_areas() {
    let (registry, clock) = registry();
    let producer = registry
        .producers()
        .create(new_producer("11144477735"))
        .unwrap();
    let farm = registry
        .farms()
        .create(new_farm(producer.id, 1000.0, 600.0, 300.0))
        .unwrap();

    // 800 + 300 > 1000 even though 800 alone fits.
    let err = registry
        .farms()
        .update(
            farm.id,
            FarmPatch {
                name: Some("Renamed".into()),
                agricultural_area: Some(800.0),
                ..FarmPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::AreaInvariantViolation { .. }));
    assert_eq!(registry.farms().get(farm.id).unwrap(), farm);

    clock.advance(Duration::hours(1));
    let updated = registry
        .farms()
        .update(
            farm.id,
            FarmPatch {
                total_area: Some(1200.0),
                agricultural_area: Some(800.0),
                ..FarmPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.total_area, 1200.0);
    assert_eq!(updated.agricultural_area, 800.0);
    assert_eq!(updated.vegetation_area, 300.0);
    assert_eq!(updated.name, farm.name);
    assert!(updated.updated_at > farm.updated_at);
}

#[test]
fn farm_update_unknown_is_not_found() {
    let (registry, _) = registry();
    let err = registry
        .farms()
        .update(agro_core::FarmId::new(), FarmPatch::default())
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

// -- Harvest / Crop --

#[test]
fn harvest_and_crop_referential_integrity() {
    let (registry, _) = registry();
    let ghost_farm = agro_core::FarmId::new();
    let err = registry
        .harvests()
        .create(NewHarvest {
            farm_id: ghost_farm,
            year: 2024,
            description: "Safra 2024".into(),
        })
        .unwrap_err();
    assert_eq!(err, DomainError::FarmNotFound(ghost_farm));

    let ghost_harvest = agro_core::HarvestId::new();
    let err = registry
        .crops()
        .create(NewCrop {
            harvest_id: ghost_harvest,
            crop_type: CropType::Soy,
            planted_area: 10.0,
        })
        .unwrap_err();
    assert_eq!(err, DomainError::HarvestNotFound(ghost_harvest));
}

#[test]
fn crop_requires_positive_planted_area() {
    let (registry, _) = registry();
    let producer = registry
        .producers()
        .create(new_producer("11144477735"))
        .unwrap();
    let farm = registry
        .farms()
        .create(new_farm(producer.id, 100.0, 60.0, 20.0))
        .unwrap();
    let harvest = registry
        .harvests()
        .create(NewHarvest {
            farm_id: farm.id,
            year: 2024,
            description: "Safra 2024".into(),
        })
        .unwrap();
    for area in [0.0, -5.0] {
        let err = registry
            .crops()
            .create(NewCrop {
                harvest_id: harvest.id,
                crop_type: CropType::Corn,
                planted_area: area,
            })
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_AREA");
    }
    assert!(registry.crops().list_by_harvest(harvest.id).is_empty());
}

#[test]
fn crop_listing_filters() {
    let (registry, _) = registry();
    let producer = registry
        .producers()
        .create(new_producer("11144477735"))
        .unwrap();
    let farm = registry
        .farms()
        .create(new_farm(producer.id, 100.0, 60.0, 20.0))
        .unwrap();
    let harvest = registry
        .harvests()
        .create(NewHarvest {
            farm_id: farm.id,
            year: 2023,
            description: "Safra 2023".into(),
        })
        .unwrap();
    for (crop_type, area) in [(CropType::Soy, 30.0), (CropType::Corn, 20.0), (CropType::Soy, 5.0)] {
        registry
            .crops()
            .create(NewCrop {
                harvest_id: harvest.id,
                crop_type,
                planted_area: area,
            })
            .unwrap();
    }
    assert_eq!(registry.crops().list_by_harvest(harvest.id).len(), 3);
    assert_eq!(registry.crops().list_by_type(CropType::Soy).len(), 2);
    assert!(registry.crops().list_by_type(CropType::Coffee).is_empty());
    assert_eq!(registry.harvests().list_by_farm(farm.id), vec![harvest]);
}

// -- Cascade --

#[test]
fn deleting_producer_cascades_to_every_descendant() {
    let (registry, _) = registry();
    let producer = registry
        .producers()
        .create(new_producer("11144477735"))
        .unwrap();
    let farm = registry
        .farms()
        .create(new_farm(producer.id, 1000.0, 600.0, 300.0))
        .unwrap();
    let harvest = registry
        .harvests()
        .create(NewHarvest {
            farm_id: farm.id,
            year: 2024,
            description: "Safra 2024".into(),
        })
        .unwrap();
    for crop_type in [CropType::Soy, CropType::Corn] {
        registry
            .crops()
            .create(NewCrop {
                harvest_id: harvest.id,
                crop_type,
                planted_area: 100.0,
            })
            .unwrap();
    }

    let report = registry.producers().delete(producer.id).unwrap();
    assert_eq!(
        report,
        CascadeReport {
            farms: 1,
            harvests: 1,
            crops: 2,
        }
    );
    let counts = registry.repository().read(|unit| unit.counts());
    assert!(counts.is_empty(), "rows left behind: {counts:?}");
}

#[test]
fn cascade_leaves_unrelated_records() {
    let (registry, _) = registry();
    let doomed = registry
        .producers()
        .create(new_producer("11144477735"))
        .unwrap();
    let kept = registry
        .producers()
        .create(new_producer("98765432100"))
        .unwrap();
    registry
        .farms()
        .create(new_farm(doomed.id, 100.0, 10.0, 10.0))
        .unwrap();
    let kept_farm = registry
        .farms()
        .create(new_farm(kept.id, 100.0, 10.0, 10.0))
        .unwrap();

    registry.producers().delete(doomed.id).unwrap();
    assert_eq!(registry.producers().list(), vec![kept]);
    assert_eq!(registry.farms().list_all(), vec![kept_farm]);
}

#[test]
fn deleting_harvest_removes_its_crops_only() {
    let (registry, _) = registry();
    let producer = registry
        .producers()
        .create(new_producer("11144477735"))
        .unwrap();
    let farm = registry
        .farms()
        .create(new_farm(producer.id, 100.0, 60.0, 20.0))
        .unwrap();
    let harvest = registry
        .harvests()
        .create(NewHarvest {
            farm_id: farm.id,
            year: 2024,
            description: "Safra 2024".into(),
        })
        .unwrap();
    registry
        .crops()
        .create(NewCrop {
            harvest_id: harvest.id,
            crop_type: CropType::Coffee,
            planted_area: 12.0,
        })
        .unwrap();

    let report = registry.harvests().delete(harvest.id).unwrap();
    assert_eq!(report.crops, 1);
    assert_eq!(report.harvests, 1);
    assert!(registry.crops().list_all().is_empty());
    assert_eq!(registry.farms().list_all().len(), 1);

    let err = registry.harvests().get(harvest.id).unwrap_err();
    assert_eq!(err, DomainError::not_found(EntityKind::Harvest, harvest.id));
}

#[test]
fn deleting_missing_records_is_not_found() {
    let (registry, _) = registry();
    assert_eq!(
        registry.producers().delete(ProducerId::new()).unwrap_err().code(),
        "NOT_FOUND"
    );
    assert_eq!(
        registry.farms().delete(agro_core::FarmId::new()).unwrap_err().code(),
        "NOT_FOUND"
    );
    assert_eq!(
        registry.crops().delete(agro_core::CropId::new()).unwrap_err().code(),
        "NOT_FOUND"
    );
}

// -- Concurrency --

#[test]
fn concurrent_duplicate_creations_admit_exactly_one() {
    let (registry, _) = registry();
    let registry = Arc::new(registry);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || registry.producers().create(new_producer("11144477735")))
        })
        .collect();
    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, DomainError::DuplicateDocument(_))));
    assert_eq!(registry.producers().list().len(), 1);
}
