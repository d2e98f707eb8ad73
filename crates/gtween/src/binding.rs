// binding.rs
//
// Adapters that bind a tween to host state held in `Rc<RefCell<_>>`.
// Targets are captured weakly: dropping the node while its tween is still
// registered is fine, the tween just stops writing.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::builder::{tween_property, TweenBuilder};
use crate::value::Lerp;

/// Animate a shared value.
pub fn tween_shared<V: Lerp>(target: &Rc<RefCell<V>>, end: V, duration: f32) -> TweenBuilder<V> {
    fn same<V>(v: &mut V) -> &mut V {
        v
    }
    tween_field(target, same::<V>, end, duration)
}

/// Animate one field of a shared node, selected by `lens`.
///
/// ```ignore
/// let tween = tween_field(&node, |n: &mut Node2D| &mut n.position, Vec2::new(100.0, 0.0), 3.0);
/// ```
pub fn tween_field<T: 'static, V: Lerp>(
    target: &Rc<RefCell<T>>,
    lens: fn(&mut T) -> &mut V,
    end: V,
    duration: f32,
) -> TweenBuilder<V> {
    let read: Weak<RefCell<T>> = Rc::downgrade(target);
    let write = read.clone();
    let fallback = end.clone();

    let getter = move || {
        let Some(node) = read.upgrade() else {
            return fallback.clone();
        };
        let current = match node.try_borrow_mut() {
            Ok(mut node) => lens(&mut node).clone(),
            Err(_) => {
                log::warn!("tween target is borrowed, starting from the end value");
                fallback.clone()
            }
        };
        current
    };

    let setter = move |value: V| {
        let Some(node) = write.upgrade() else {
            return;
        };
        let borrowed = node.try_borrow_mut();
        match borrowed {
            Ok(mut node) => *lens(&mut node) = value,
            Err(_) => log::warn!("tween target is borrowed, skipping write"),
        };
    };

    tween_property(getter, setter, end, duration)
}
