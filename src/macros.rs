/// Declares that concrete types can be stored in a container of a trait
/// object base type.
///
/// `impl_element!(dyn Trait: A, B)` implements [`Element<dyn Trait>`] for `A`
/// and `B` through the unsizing coercion, which requires each type to
/// implement `Trait`. Auto-trait bounds are written as part of the base type.
///
/// Containers of `dyn Any`, `dyn Any + Send`, `dyn Any + Send + Sync` and of a
/// concrete type accept every suitable type without this macro.
///
/// [`Element<dyn Trait>`]: crate::Element
///
/// # Examples
///
/// ```
/// use polyvec::prelude::*;
///
/// trait Animal {
///     fn name(&self) -> &str;
/// }
///
/// #[derive(Clone)]
/// struct Dog;
///
/// #[derive(Clone)]
/// struct Cat;
///
/// impl Animal for Dog {
///     fn name(&self) -> &str {
///         "dog"
///     }
/// }
///
/// impl Animal for Cat {
///     fn name(&self) -> &str {
///         "cat"
///     }
/// }
///
/// impl_element!(dyn Animal + Send + Sync: Dog, Cat);
///
/// let mut animals = PolyVec::<dyn Animal + Send + Sync>::new();
/// animals.push(Dog)?;
/// animals.push(Cat)?;
///
/// let names: Vec<&str> = animals.iter().map(|animal| animal.name()).collect();
/// assert_eq!(names, ["dog", "cat"]);
/// # Ok::<(), polyvec::Error>(())
/// ```
#[macro_export]
macro_rules! impl_element {
    ($base:ty: $($ty:ty),+ $(,)?) => {
        $(
            // SAFETY: The unsizing coercion keeps the address and provenance,
            // and only compiles if the auto traits of the base type hold.
            unsafe impl $crate::Element<$base> for $ty {
                #[inline]
                fn upcast(
                    ptr: $crate::__private::NonNull<Self>,
                ) -> $crate::__private::NonNull<$base> {
                    ptr
                }
            }
        )+
    };
}
