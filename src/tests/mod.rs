mod api_wiki_router;
