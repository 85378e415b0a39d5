use std::sync::Arc;

use proptest::prelude::*;
use stowage_index::{Error, IndexSetter, KeyValueIndexSetter, completion_channels};
use stowage_store::{KeyValues, MemoryStore, ModTime};

fn setter_with(len: usize) -> KeyValueIndexSetter<MemoryStore> {
    let ids: Vec<String> = (0..len).map(|i| format!("id-{i}")).collect();
    KeyValueIndexSetter::new(Arc::new(MemoryStore::new()), ids)
}

proptest! {
    #[test]
    fn exists_is_constant_false(len in 0usize..32, index in any::<isize>(), stored in any::<bool>()) {
        let setter = setter_with(len);
        if stored && len > 0 {
            setter.store().set("id-0", &mut &b"present"[..]).unwrap();
        }
        prop_assert!(!setter.exists(index));
    }

    #[test]
    fn count_is_invariant(len in 0usize..64) {
        let setter = setter_with(len);
        prop_assert_eq!(setter.count(), len);
        prop_assert_eq!(setter.count(), setter.ids().len());
    }

    #[test]
    fn out_of_range_write_reports_one_error(len in 0usize..16, offset in 0isize..1000, negative in any::<bool>()) {
        let setter = setter_with(len);
        let index = if negative { -1 - offset } else { len as isize + offset };
        let (results, errors, mut completions) = completion_channels();

        setter.write(index, Box::new(&b"data"[..]), &results, &errors);

        let outcome = completions.try_recv();
        prop_assert!(completions.try_recv().is_none());
        match outcome {
            Some(stowage_index::IndexOutcome::Error(error)) => {
                prop_assert_eq!(error.index, index);
                let is_out_of_bounds = matches!(error.error, Error::OutOfBounds { .. });
                prop_assert!(is_out_of_bounds);
            }
            other => prop_assert!(false, "unexpected outcome: {:?}", other),
        }
        prop_assert!(setter.store().keys().unwrap().is_empty());
        prop_assert_eq!(setter.file_mod_time(index).unwrap(), ModTime::UNKNOWN);
        prop_assert!(!setter.is_updated_after(index, ModTime::from_unix(0)).unwrap());
    }
}
