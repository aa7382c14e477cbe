// @generated by understudy-gen. Do not edit.

use super::*;
/// Mock implementation of [`UserRepository`], backed by a [`Substitute`](::understudy::Substitute).
pub struct MockUserRepository<'a> {
    substitute: &'a ::understudy::Substitute,
}
impl<'a> MockUserRepository<'a> {
    pub fn new(substitute: &'a ::understudy::Substitute) -> Self {
        MockUserRepository { substitute }
    }
    /// The substitute that answers calls to this mock
    pub fn substitute(&self) -> &'a ::understudy::Substitute {
        self.substitute
    }
}
impl UserRepository for MockUserRepository<'_> {
    #[track_caller]
    fn find_by_id(&self, id: &str) -> Result<User, RepoError> {
        let mut returns = self
            .substitute
            .dispatch(
                "find_by_id",
                ::understudy::args![::std::borrow::ToOwned::to_owned(&* id)],
            );
        returns
            .take::<Result<User, RepoError>>(0)
            .unwrap_or_else(|| ::std::result::Result::Ok(
                ::std::default::Default::default(),
            ))
    }
    #[track_caller]
    fn save(&self, user: User) -> Result<(), RepoError> {
        let mut returns = self.substitute.dispatch("save", ::understudy::args![user]);
        returns
            .take::<Result<(), RepoError>>(0)
            .unwrap_or_else(|| ::std::result::Result::Ok(()))
    }
    #[track_caller]
    fn delete(&self, id: &str) -> Result<(), RepoError> {
        let mut returns = self
            .substitute
            .dispatch(
                "delete",
                ::understudy::args![::std::borrow::ToOwned::to_owned(&* id)],
            );
        returns
            .take::<Result<(), RepoError>>(0)
            .unwrap_or_else(|| ::std::result::Result::Ok(()))
    }
    #[track_caller]
    fn counts(&self) -> (usize, Option<String>) {
        let mut returns = self.substitute.dispatch("counts", ::understudy::args![]);
        (
            returns.take::<usize>(0).unwrap_or_else(|| ::std::default::Default::default()),
            returns
                .take::<Option<String>>(1)
                .unwrap_or_else(|| ::std::option::Option::None),
        )
    }
    #[track_caller]
    fn export(&self, path: &str) -> io::Result<usize> {
        let mut returns = self
            .substitute
            .dispatch(
                "export",
                ::understudy::args![::std::borrow::ToOwned::to_owned(&* path)],
            );
        returns
            .take::<io::Result<usize>>(0)
            .unwrap_or_else(|| ::std::result::Result::Ok(
                ::std::default::Default::default(),
            ))
    }
}
