//! End-to-end verification scenarios against an in-memory class world.

mod common;

use common::{code_item, FakeDex};
use dex_verifier::prelude::*;
use dex_verifier::resolver::access_flags::*;
use dex_verifier::error::ErrorKinds;
use dex_verifier::reg_type_cache;

fn options() -> VerifierOptions {
    VerifierOptions::default()
}

fn legacy_options() -> VerifierOptions {
    // Targets an api level before S_V2, enabling the dead-code
    // compatibility behavior behind guaranteed runtime throws.
    VerifierOptions {
        api_level: 30,
        aot_mode: false,
    }
}

#[test]
fn simple_add_verifies_cleanly() {
    let mut dex = FakeDex::new("LMain;");
    let method_idx = dex.add_method("LMain;", "add", "I", &["I"], ACC_PUBLIC | ACC_STATIC);
    let code = code_item(
        2,
        1,
        0,
        [op::const4(0, 2), op::add_int_2addr(0, 0), op::ret(0)].concat(),
    );
    let method = MethodInfo {
        method_idx,
        access_flags: ACC_PUBLIC | ACC_STATIC,
    };
    let resolver = &dex;
    let result = verify_method(&resolver, &method, Some(&code), &options());
    assert_eq!(result.kind, FailureKind::NoFailure, "{result:?}");
    assert!(result.types.is_empty());
}

#[test]
fn returning_the_wrong_category_fails_hard() {
    let mut dex = FakeDex::new("LMain;");
    let method_idx = dex.add_method("LMain;", "wide", "J", &[], ACC_PUBLIC | ACC_STATIC);
    // Returns a category-1 value from a long method.
    let code = code_item(2, 0, 0, [op::const4(0, 2), op::ret(0)].concat());
    let method = MethodInfo {
        method_idx,
        access_flags: ACC_PUBLIC | ACC_STATIC,
    };
    let resolver = &dex;
    let result = verify_method(&resolver, &method, Some(&code), &options());
    assert_eq!(result.kind, FailureKind::HardFailure);
    assert!(result.hard_failure_msg.is_some());
}

#[test]
fn unbalanced_lock_is_a_soft_failure() {
    let mut dex = FakeDex::new("LMain;");
    let method_idx = dex.add_method("LMain;", "lock", "V", &[], ACC_PUBLIC);
    let code = code_item(1, 1, 0, [op::monitor_enter(0), op::return_void()].concat());
    let method = MethodInfo {
        method_idx,
        access_flags: ACC_PUBLIC,
    };
    let resolver = &dex;
    let result = verify_method(&resolver, &method, Some(&code), &options());
    assert_eq!(result.kind, FailureKind::SoftFailure);
    assert!(result.types.contains(ErrorKinds::LOCKING));
}

#[test]
fn double_lock_marks_runtime_throw_on_legacy_api_levels() {
    let mut dex = FakeDex::new("LMain;");
    let method_idx = dex.add_method("LMain;", "lock", "V", &[], ACC_PUBLIC);
    let code = code_item(
        1,
        1,
        0,
        [op::monitor_enter(0), op::monitor_enter(0), op::return_void()].concat(),
    );
    let method = MethodInfo {
        method_idx,
        access_flags: ACC_PUBLIC,
    };
    let resolver = &dex;
    let result = verify_method(&resolver, &method, Some(&code), &legacy_options());
    assert_eq!(result.kind, FailureKind::SoftFailure);
    assert!(result.types.contains(ErrorKinds::LOCKING | ErrorKinds::RUNTIME_THROW));
}

#[test]
fn constructor_initializes_all_aliases() {
    let mut dex = FakeDex::new("LMain;");
    dex.add_class("LFoo;", ACC_PUBLIC, Some("Ljava/lang/Object;"), &[]);
    dex.add_method("Ljava/lang/Object;", "<init>", "V", &[], ACC_PUBLIC | ACC_CONSTRUCTOR);
    let foo_init = dex.add_method("LFoo;", "<init>", "V", &[], ACC_PUBLIC | ACC_CONSTRUCTOR);
    let field = dex.add_field("LFoo;", "f", "I", ACC_PUBLIC);
    let method_idx = dex.add_method("LMain;", "make", "V", &["I"], ACC_PUBLIC | ACC_STATIC);
    let foo_type = dex.type_index("LFoo;");

    // new-instance v0, Foo; invoke-direct {v0}, Foo.<init>;
    // iput v1, v0, Foo.f; return-void
    let code = code_item(
        2,
        1,
        1,
        [
            op::new_instance(0, foo_type.index()),
            op::invoke_direct(&[0], foo_init.index() as u16),
            op::iput(1, 0, field.index() as u16),
            op::return_void(),
        ]
        .concat(),
    );
    let method = MethodInfo {
        method_idx,
        access_flags: ACC_PUBLIC | ACC_STATIC,
    };
    let resolver = &dex;
    let result = verify_method(&resolver, &method, Some(&code), &options());
    assert_eq!(result.kind, FailureKind::NoFailure, "{result:?}");
}

#[test]
fn constructor_body_writes_own_field_before_super_call_return() {
    let mut dex = FakeDex::new("LMain;");
    dex.add_method("Ljava/lang/Object;", "<init>", "V", &[], ACC_PUBLIC | ACC_CONSTRUCTOR);
    let object_init = dex
        .methods
        .iter()
        .position(|m| m.name == "<init>")
        .unwrap() as u16;
    let field = dex.add_field("LMain;", "f", "I", ACC_PUBLIC);
    let method_idx = dex.add_method("LMain;", "<init>", "V", &["I"], ACC_PUBLIC | ACC_CONSTRUCTOR);

    // invoke-direct {v0}, Object.<init>; iput v1, v0, Main.f; return-void
    let code = code_item(
        2,
        2,
        1,
        [
            op::invoke_direct(&[0], object_init),
            op::iput(1, 0, field.index() as u16),
            op::return_void(),
        ]
        .concat(),
    );
    let method = MethodInfo {
        method_idx,
        access_flags: ACC_PUBLIC | ACC_CONSTRUCTOR,
    };
    let resolver = &dex;
    let result = verify_method(&resolver, &method, Some(&code), &options());
    assert_eq!(result.kind, FailureKind::NoFailure, "{result:?}");
}

#[test]
fn constructor_returning_without_super_call_fails() {
    let mut dex = FakeDex::new("LMain;");
    let method_idx = dex.add_method("LMain;", "<init>", "V", &[], ACC_PUBLIC | ACC_CONSTRUCTOR);
    let code = code_item(1, 1, 0, op::return_void());
    let method = MethodInfo {
        method_idx,
        access_flags: ACC_PUBLIC | ACC_CONSTRUCTOR,
    };
    let resolver = &dex;
    let result = verify_method(&resolver, &method, Some(&code), &options());
    assert_eq!(result.kind, FailureKind::HardFailure);
    let message = result.hard_failure_msg.unwrap();
    assert!(message.contains("superclass constructor"), "{message}");
}

#[test]
fn aliased_new_instance_merge_downgrades_to_conflict() {
    let mut dex = FakeDex::new("LMain;");
    dex.add_class("LFoo;", ACC_PUBLIC, Some("Ljava/lang/Object;"), &[]);
    let foo_init = dex.add_method("LFoo;", "<init>", "V", &[], ACC_PUBLIC | ACC_CONSTRUCTOR);
    let method_idx = dex.add_method("LMain;", "make", "V", &["Z"], ACC_PUBLIC | ACC_STATIC);
    let foo_type = dex.type_index("LFoo;");

    // Two new-instance sites for the same class meet at the constructor
    // call; the allocation pcs disagree, so the join is a conflict.
    //
    //  0: if-eqz v1, +5
    //  2: new-instance v0, Foo
    //  4: goto +3
    //  5: new-instance v0, Foo
    //  7: invoke-direct {v0}, Foo.<init>
    // 10: return-void
    let code = code_item(
        2,
        1,
        1,
        [
            op::if_eqz(1, 5),
            op::new_instance(0, foo_type.index()),
            op::goto_(3),
            op::new_instance(0, foo_type.index()),
            op::invoke_direct(&[0], foo_init.index() as u16),
            op::return_void(),
        ]
        .concat(),
    );
    let method = MethodInfo {
        method_idx,
        access_flags: ACC_PUBLIC | ACC_STATIC,
    };
    let resolver = &dex;
    let result = verify_method(&resolver, &method, Some(&code), &options());
    assert_eq!(result.kind, FailureKind::HardFailure, "{result:?}");
}

#[test]
fn instance_of_peephole_sharpens_the_taken_branch() {
    let mut dex = FakeDex::new("LMain;");
    dex.add_class("LBaz;", ACC_PUBLIC, Some("Ljava/lang/Object;"), &[]);
    dex.add_class("LBar;", ACC_PUBLIC, Some("LBaz;"), &[]);
    let bar_method = dex.add_method("LBar;", "bar", "V", &[], ACC_PUBLIC);
    let method_idx = dex.add_method("LMain;", "test", "V", &["LBaz;"], ACC_PUBLIC);
    let bar_type = dex.type_index("LBar;");

    // The branch edge of if-nez carries v2 sharpened to Bar, so the
    // virtual call on Bar verifies; without the peephole the receiver
    // would still be Baz and the call would be rejected.
    //
    //  0: instance-of v0, v2, Bar
    //  2: if-nez v0, +3
    //  4: return-void
    //  5: invoke-virtual {v2}, Bar.bar
    //  8: return-void
    let code = code_item(
        3,
        2,
        1,
        [
            op::instance_of(0, 2, bar_type.index()),
            op::if_nez(0, 3),
            op::return_void(),
            op::invoke_virtual(&[2], bar_method.index() as u16),
            op::return_void(),
        ]
        .concat(),
    );
    let method = MethodInfo {
        method_idx,
        access_flags: ACC_PUBLIC,
    };
    let resolver = &dex;
    let result = verify_method(&resolver, &method, Some(&code), &options());
    assert_eq!(result.kind, FailureKind::NoFailure, "{result:?}");
}

#[test]
fn virtual_call_on_unrelated_receiver_fails_without_the_peephole() {
    let mut dex = FakeDex::new("LMain;");
    dex.add_class("LBaz;", ACC_PUBLIC, Some("Ljava/lang/Object;"), &[]);
    dex.add_class("LBar;", ACC_PUBLIC, Some("LBaz;"), &[]);
    let bar_method = dex.add_method("LBar;", "bar", "V", &[], ACC_PUBLIC);
    let method_idx = dex.add_method("LMain;", "test", "V", &["LBaz;"], ACC_PUBLIC);

    // No instance-of guard: calling Bar.bar on a Baz receiver is rejected.
    let code = code_item(
        3,
        2,
        1,
        [op::invoke_virtual(&[2], bar_method.index() as u16), op::return_void()].concat(),
    );
    let method = MethodInfo {
        method_idx,
        access_flags: ACC_PUBLIC,
    };
    let resolver = &dex;
    let result = verify_method(&resolver, &method, Some(&code), &options());
    assert_eq!(result.kind, FailureKind::HardFailure);
}

#[test]
fn unresolved_return_type_defers_the_check() {
    let mut dex = FakeDex::new("LMain;");
    dex.add_class("LFoo;", ACC_PUBLIC, Some("Ljava/lang/Object;"), &[]);
    // The parameter class is never registered, so it stays unresolved.
    let method_idx = dex.add_method(
        "LMain;",
        "pass",
        "LFoo;",
        &["LMystery;"],
        ACC_PUBLIC | ACC_STATIC,
    );
    let code = code_item(1, 1, 0, op::return_object(0));
    let method = MethodInfo {
        method_idx,
        access_flags: ACC_PUBLIC | ACC_STATIC,
    };
    let resolver = &dex;
    let result = verify_method(&resolver, &method, Some(&code), &options());
    assert_eq!(result.kind, FailureKind::TypeChecksFailure, "{result:?}");
    assert!(result.types.contains(ErrorKinds::UNRESOLVED_TYPE_CHECK));
}

#[test]
fn unresolved_array_merge_collapses_with_primitive_arrays() {
    let mut dex = FakeDex::new("LMain;");
    dex.add_primitive_class("I", PrimitiveType::Int);
    dex.add_array_class("[I", "I");
    dex.type_index("[LUnresolvedA;");
    dex.type_index("[LUnresolvedB;");
    dex.type_index("[I");

    let resolver = &dex;
    let mut cache = RegTypeCache::new(&resolver);
    let a = cache.from_descriptor("[LUnresolvedA;");
    let b = cache.from_descriptor("[LUnresolvedB;");
    assert_eq!(cache.kind_of(a), Kind::UnresolvedReference);
    assert_eq!(cache.kind_of(b), Kind::UnresolvedReference);

    let merged = cache.merge(a, b);
    assert_eq!(cache.kind_of(merged), Kind::UnresolvedMergedReference);
    assert!(cache.is_array_types(merged));
    assert!(cache.is_object_array_types(merged));
    let members: Vec<usize> = cache.get(merged).unresolved_types().indexes().collect();
    assert_eq!(members, vec![a as usize, b as usize]);

    // Merging the same operands again returns the interned entry.
    assert_eq!(cache.merge(a, b), merged);

    // A primitive array mixed in collapses the join to java.lang.Object.
    let int_array = cache.from_descriptor("[I");
    assert_eq!(cache.kind_of(int_array), Kind::Reference);
    let collapsed = cache.merge(merged, int_array);
    assert_eq!(
        collapsed,
        reg_type_cache::id_for_kind(Kind::JavaLangObject)
    );
}

#[test]
fn fixed_cache_ids_follow_kind_discriminants() {
    let dex = FakeDex::new("LMain;");
    let resolver = &dex;
    let cache = RegTypeCache::new(&resolver);
    for id in 0..reg_type_cache::NUM_REG_KIND_CACHE_IDS {
        assert_eq!(cache.kind_of(id) as u16, id);
    }
    // The last fixed entry is the pre-built uninitialized Object twin.
    assert_eq!(
        cache.kind_of(reg_type_cache::UNINITIALIZED_JAVA_LANG_OBJECT_ID),
        Kind::UninitializedReference
    );
    assert_eq!(
        cache.from_uninitialized(reg_type_cache::UNINITIALIZED_JAVA_LANG_OBJECT_ID),
        reg_type_cache::id_for_kind(Kind::JavaLangObject)
    );
}

#[test]
fn uninitialized_twins_are_linked_both_ways() {
    let mut dex = FakeDex::new("LMain;");
    dex.add_class("LFoo;", ACC_PUBLIC, Some("Ljava/lang/Object;"), &[]);
    dex.type_index("LFoo;");

    let resolver = &dex;
    let mut cache = RegTypeCache::new(&resolver);
    let foo = cache.from_descriptor("LFoo;");
    let uninit = cache.uninitialized(foo);
    assert_eq!(cache.kind_of(uninit), Kind::UninitializedReference);
    assert_eq!(cache.from_uninitialized(uninit), foo);
    // The twin is cached, not recreated.
    assert_eq!(cache.uninitialized(foo), uninit);

    let uninit_this = cache.uninitialized_this_argument(foo);
    assert_eq!(cache.kind_of(uninit_this), Kind::UninitializedThisReference);
    assert_eq!(cache.from_uninitialized(uninit_this), foo);
    assert_eq!(cache.uninitialized_this_argument(foo), uninit_this);
}

#[test]
fn component_types_resolve_through_descriptors() {
    let mut dex = FakeDex::new("LMain;");
    dex.add_primitive_class("I", PrimitiveType::Int);
    dex.add_array_class("[I", "I");
    dex.type_index("[I");

    let resolver = &dex;
    let mut cache = RegTypeCache::new(&resolver);
    let int_array = cache.from_descriptor("[I");
    let component = cache.component_type(int_array);
    assert_eq!(component, reg_type_cache::id_for_kind(Kind::Integer));

    // Unresolved arrays strip one dimension off the descriptor.
    let unresolved = cache.from_descriptor("[[LMystery;");
    let inner = cache.component_type(unresolved);
    assert_eq!(cache.kind_of(inner), Kind::UnresolvedReference);
    assert_eq!(cache.get(inner).descriptor(), "[LMystery;");
}

#[test]
fn register_line_merge_is_idempotent() {
    let dex = FakeDex::new("LMain;");
    let resolver = &dex;
    let mut cache = RegTypeCache::new(&resolver);
    let mut line = RegisterLine::new(4);
    line.set_register_kind(0, Kind::Integer);
    line.set_register_kind(1, Kind::Zero);
    line.set_register_kind(2, Kind::JavaLangObject);
    let other = line.clone();
    let outcome = line.merge(&mut cache, &other);
    assert!(!outcome.changed);
    assert!(outcome.lock_failure.is_none());
}

#[test]
fn find_locks_reports_aliases() {
    let mut dex = FakeDex::new("LMain;");
    let method_idx = dex.add_method("LMain;", "sync", "V", &[], ACC_PUBLIC);
    // v1 = this; lock it, copy the reference, unlock through the copy.
    //  0: move-object v0, v1
    //  1: monitor-enter v1
    //  2: monitor-exit v0
    //  3: return-void
    let code = code_item(
        2,
        1,
        0,
        [
            op::move_object(0, 1),
            op::monitor_enter(1),
            op::monitor_exit(0),
            op::return_void(),
        ]
        .concat(),
    );
    let method = MethodInfo {
        method_idx,
        access_flags: ACC_PUBLIC,
    };
    let resolver = &dex;
    let result = verify_method(&resolver, &method, Some(&code), &options());
    assert_eq!(result.kind, FailureKind::NoFailure, "{result:?}");

    let locks = find_locks_at_dex_pc(&resolver, &method, &code, &options(), 2);
    assert_eq!(locks.len(), 1);
    assert_eq!(locks[0].dex_pc, 1);
    assert!(locks[0].dex_registers.contains(&0));
    assert!(locks[0].dex_registers.contains(&1));
}

#[test]
fn methodless_preconditions() {
    let mut dex = FakeDex::new("LMain;");
    let native_idx = dex.add_method("LMain;", "nat", "V", &[], ACC_PUBLIC | ACC_NATIVE);
    let broken_idx = dex.add_method("LMain;", "broken", "V", &[], ACC_PUBLIC);
    let resolver = &dex;

    let native = MethodInfo {
        method_idx: native_idx,
        access_flags: ACC_PUBLIC | ACC_NATIVE,
    };
    let result = verify_method(&resolver, &native, None, &options());
    assert_eq!(result.kind, FailureKind::NoFailure);

    // A concrete method without code is structurally broken.
    let broken = MethodInfo {
        method_idx: broken_idx,
        access_flags: ACC_PUBLIC,
    };
    let result = verify_method(&resolver, &broken, None, &options());
    assert_eq!(result.kind, FailureKind::HardFailure);
}

#[test]
fn branch_into_instruction_middle_is_rejected() {
    let mut dex = FakeDex::new("LMain;");
    let method_idx = dex.add_method("LMain;", "jump", "V", &[], ACC_PUBLIC | ACC_STATIC);
    // goto into the middle of the const/16 at pc 1.
    let code = code_item(
        1,
        0,
        0,
        [op::goto_(2), op::const16(0, 7), op::return_void()].concat(),
    );
    let method = MethodInfo {
        method_idx,
        access_flags: ACC_PUBLIC | ACC_STATIC,
    };
    let resolver = &dex;
    let result = verify_method(&resolver, &method, Some(&code), &options());
    assert_eq!(result.kind, FailureKind::HardFailure);
}

#[test]
fn exception_handler_receives_the_pre_instruction_state() {
    let mut dex = FakeDex::new("LMain;");
    dex.add_class("LFoo;", ACC_PUBLIC, Some("Ljava/lang/Object;"), &[]);
    let foo_init = dex.add_method("LFoo;", "<init>", "V", &[], ACC_PUBLIC | ACC_CONSTRUCTOR);
    let method_idx = dex.add_method("LMain;", "tryit", "V", &[], ACC_PUBLIC | ACC_STATIC);
    let foo_type = dex.type_index("LFoo;");
    let throwable = dex.type_index("Ljava/lang/Throwable;");

    //  0: new-instance v0, Foo
    //  2: invoke-direct {v0}, Foo.<init>   (in try)
    //  5: return-void
    //  6: move-exception v0                (handler)
    //  7: return-void
    let mut code = code_item(
        1,
        0,
        1,
        [
            op::new_instance(0, foo_type.index()),
            op::invoke_direct(&[0], foo_init.index() as u16),
            op::return_void(),
            op::move_exception(0),
            op::return_void(),
        ]
        .concat(),
    );
    code.tries.push(TryItem {
        start_addr: 2,
        insn_count: 3,
        handler_index: 0,
    });
    code.handlers.push(vec![CatchHandler {
        type_idx: Some(throwable),
        address: 6,
    }]);
    let method = MethodInfo {
        method_idx,
        access_flags: ACC_PUBLIC | ACC_STATIC,
    };
    let resolver = &dex;
    let result = verify_method(&resolver, &method, Some(&code), &options());
    assert_eq!(result.kind, FailureKind::NoFailure, "{result:?}");
}
