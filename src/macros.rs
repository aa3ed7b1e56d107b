pub use enclose::*;

/// Registers a watcher, cloning the listed captures into the closure.
///
/// ```
/// use refwatch::Ref;
///
/// let price = Ref::new(10u32);
/// let quantity = Ref::new(2u32);
/// let label = String::from("total");
///
/// let mut subscription = refwatch::watch!((label) [price, quantity] actual, _previous, _token => {
/// 	println!("{}: {}", label, actual[0] * actual[1]);
/// })
/// .unwrap();
///
/// subscription.initial().unwrap().wait();
/// subscription.stop();
/// ```
#[macro_export]
macro_rules! watch {
    (( $($d_tt:tt)* ) [ $($dep:expr),* $(,)? ] $actual:ident, $previous:ident, $token:ident => $($b:tt)*) => {
        $crate::watch(
            &[$( $dep.clone() ),*],
            $crate::macros::enclose!(($( $d_tt )*) move |$actual: &[_], $previous: Option<&[_]>, $token: &$crate::Token| { $($b)* }),
        )
    };
    ([ $($dep:expr),* $(,)? ] $actual:ident, $previous:ident, $token:ident => $($b:tt)*) => {
        $crate::watch(
            &[$( $dep.clone() ),*],
            move |$actual: &[_], $previous: Option<&[_]>, $token: &$crate::Token| { $($b)* },
        )
    };
}
